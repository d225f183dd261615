/// Print the configuration the measurement layer would start with
///
/// Run with: cargo run -p scribe-config --example print_config

fn main() {
    let config = scribe_config::ScribeConfig::load();

    println!("=== Scribe Configuration ===\n");

    println!("Text Settings:");
    println!("  Default Family: {:?}", config.text.default_family);
    println!("  Default Size: {:?}", config.text.default_size);
    println!("  Font Dirs: {:?}", config.text.font_dirs);
    println!("  System Fonts: {}", config.text.load_system_fonts);
    println!();

    println!("Surface Settings:");
    println!("  Default DPI: {}", config.surface.default_dpi);
    println!("  Effective DPI: {}", config.surface.effective_dpi());
    println!();

    match toml::to_string_pretty(&config) {
        Ok(toml_str) => {
            println!("=== Serialized Configuration ===");
            println!("{}", toml_str);
        }
        Err(e) => {
            eprintln!("Failed to serialize config: {}", e);
        }
    }
}
