use std::path::Path;

use crate::error::{CuadreError, Result};
use crate::settings::{load_settings, save_settings, settings_path, Settings};

pub fn show(config: Option<&str>) -> Result<()> {
    let settings = load_settings(config.map(Path::new))?;
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

pub fn init(config: Option<&str>, force: bool) -> Result<()> {
    let path = config.map_or_else(settings_path, |p| Path::new(p).to_path_buf());
    if path.exists() && !force {
        return Err(CuadreError::Settings(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    let written = save_settings(&Settings::default(), Some(&path))?;
    println!("Wrote default settings to {}", written.display());
    Ok(())
}

pub fn path() -> Result<()> {
    println!("{}", settings_path().display());
    Ok(())
}
