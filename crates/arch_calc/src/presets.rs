use cost_engine::Preset;

/// Prints the built-in presets with their families.
pub fn run() {
    println!("{:<16} {:<14} Label", "Preset", "Family");
    for preset in Preset::ALL {
        println!(
            "{:<16} {:<14} {}",
            preset.name(),
            preset.family().as_str(),
            preset.display_name()
        );
    }
}
