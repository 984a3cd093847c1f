use std::path::PathBuf;

use crate::error::Result;
use crate::loader::load_file;
use crate::settings::{load_settings, save_settings, shellexpand_path};

pub fn run(path: &str) -> Result<()> {
    let resolved = PathBuf::from(shellexpand_path(path));
    // Refuse to switch to a file the dashboard could not open.
    let data = load_file(&resolved)?;

    let mut settings = load_settings();
    settings.data_file = resolved.to_string_lossy().to_string();
    save_settings(&settings)?;

    println!("Switched to {} ({} records)", resolved.display(), data.len());
    Ok(())
}
