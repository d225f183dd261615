//! Print the per-byte caret table for a line using the installed fonts.
//!
//! Usage: `cargo run -p scribe-text --example measure_line -- "text" [family] [points]`

use scribe_text::{
    DeviceContext, FontHandle, FontLibrary, FontParameters, LayoutService, SystemLayoutService,
    measure,
};

fn main() {
    let mut args = std::env::args().skip(1);
    let text = args.next().unwrap_or_else(|| "a😀b".to_string());
    let family = args.next().unwrap_or_else(|| "sans-serif".to_string());
    let points = args.next().and_then(|s| s.parse().ok()).unwrap_or(10.0);

    let service = SystemLayoutService::new(FontLibrary::with_system_fonts());
    let font = FontHandle::create(FontParameters::new(family, points));
    let device = DeviceContext::default();

    let table = measure(text.as_bytes(), &font, &service, &device);
    for (byte, (value, x)) in text.as_bytes().iter().zip(table.iter()).enumerate() {
        println!("{byte:>3}  0x{value:02X}  {x:8.2}");
    }
    println!("width: {:.2}", table.width());

    if let Some(params) = font.parameters() {
        if let Some(metrics) = service.font_metrics(params, &device) {
            println!("metrics: {metrics:?}");
        }
    }
}
