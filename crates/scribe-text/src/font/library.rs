use std::path::Path;
use std::sync::Arc;

use fontdb::{Database, Family, Query, Style, Weight};
use hashbrown::HashMap;

use crate::font::{FontError, FontFace, FontParameters, Result};

/// Key for identifying a resolved face within the library.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FaceKey {
    pub family: String,
    pub bold: bool,
    pub italic: bool,
}

impl FaceKey {
    pub fn new(params: &FontParameters) -> Self {
        Self {
            family: params.family.clone(),
            bold: params.is_bold(),
            italic: params.italic,
        }
    }
}

/// Font database plus a cache of faces already resolved from it.
///
/// Family names are matched through `fontdb`; when the requested family is
/// not installed the generic sans-serif family is used instead.
pub struct FontLibrary {
    db: Database,
    faces: HashMap<FaceKey, Arc<FontFace>>,
}

impl std::fmt::Debug for FontLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontLibrary")
            .field("db_faces", &self.db.len())
            .field("cached", &self.faces.len())
            .finish()
    }
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl FontLibrary {
    /// An empty library; add fonts with the `load_*` methods.
    pub fn new() -> Self {
        Self {
            db: Database::new(),
            faces: HashMap::new(),
        }
    }

    /// A library populated with the platform's installed fonts.
    pub fn with_system_fonts() -> Self {
        let mut library = Self::new();
        library.db.load_system_fonts();
        tracing::debug!(faces = library.db.len(), "loaded system fonts");
        library
    }

    /// Scan a directory for font files.
    pub fn load_fonts_dir(&mut self, dir: impl AsRef<Path>) {
        self.db.load_fonts_dir(dir);
    }

    /// Register an in-memory font file.
    pub fn load_font_data(&mut self, data: Vec<u8>) {
        self.db.load_font_data(data);
    }

    /// Number of faces known to the database.
    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    /// First family name among the generic sans-serif faces, if any.
    pub fn sans_serif_family(&self) -> Option<String> {
        let id = self.db.query(&Query {
            families: &[Family::SansSerif],
            ..Query::default()
        })?;
        let face = self.db.face(id)?;
        face.families.first().map(|(name, _)| name.clone())
    }

    /// Get a face for `params` from the cache or resolve it from the database.
    pub fn resolve(&mut self, params: &FontParameters) -> Result<Arc<FontFace>> {
        let key = FaceKey::new(params);
        if let Some(face) = self.faces.get(&key) {
            return Ok(face.clone());
        }

        let face = Arc::new(self.load_face(&key)?);
        self.faces.insert(key, face.clone());
        Ok(face)
    }

    fn load_face(&self, key: &FaceKey) -> Result<FontFace> {
        let weight = if key.bold { Weight::BOLD } else { Weight::NORMAL };
        let style = if key.italic { Style::Italic } else { Style::Normal };

        let id = self
            .db
            .query(&Query {
                families: &[Family::Name(&key.family), Family::SansSerif],
                weight,
                style,
                ..Query::default()
            })
            .ok_or_else(|| FontError::NoFace(key.family.clone()))?;

        self.db
            .with_face_data(id, |data, index| FontFace::from_vec(data.to_vec(), index as usize))
            .ok_or_else(|| FontError::NoFace(key.family.clone()))?
    }
}
