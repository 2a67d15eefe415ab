/// Example program to print the loaded configuration
///
/// Run with: cargo run -p trellis-config --example print_config

fn main() {
    let config = trellis_config::TrellisConfig::load();

    println!("=== Trellis Configuration ===\n");

    println!("Window Settings:");
    println!("  Title: {}", config.window.title);
    println!("  Size: {}x{}", config.window.width, config.window.height);
    println!("  Resizable: {}", config.window.resizable);
    println!("  High DPI: {}", config.window.high_dpi);
    println!("  VSync: {}", config.window.vsync);
    println!();

    println!("Text Settings:");
    println!("  Font: {:?}", config.text.font);
    println!("  Font Size: {}", config.text.font_size);
    println!();

    println!("Layout Settings:");
    println!("  Max Elements: {}", config.layout.max_element_count);
    println!("  Word Cache: {}", config.layout.max_measure_text_word_cache);
    println!("  Drag Scrolling: {}", config.layout.drag_scrolling);
    println!("  Scroll Speed: {}", config.layout.scroll_speed);
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
