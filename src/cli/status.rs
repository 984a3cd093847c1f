use crate::error::Result;
use crate::loader::load_file;
use crate::settings::{load_settings, resolve_data_file, settings_path};

pub fn run(file: Option<String>) -> Result<()> {
    let settings = load_settings();
    let range = settings.year_range()?;
    let path = resolve_data_file(&settings, file.as_deref());

    println!("Settings:    {}", settings_path().display());
    println!("Data file:   {}", path.display());
    println!("Year range:  {range} (default {})", range.clamp(settings.default_year));

    if !path.exists() {
        println!();
        println!("Data file not found. Run `autosales load <path>` or `autosales demo`.");
        return Ok(());
    }

    let data = load_file(&path)?;
    println!();
    println!("Records:     {}", data.len());
    println!("Recession:   {}", data.recession_count());
    match data.year_span() {
        Some((first, last)) => println!("Years:       {first}-{last}"),
        None => println!("Years:       (none)"),
    }
    let vehicles = data.vehicle_types();
    if vehicles.is_empty() {
        println!("Vehicles:    (none)");
    } else {
        println!("Vehicles:    {}", vehicles.join(", "));
    }
    Ok(())
}
