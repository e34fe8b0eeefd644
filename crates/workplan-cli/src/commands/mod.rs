pub mod schedule;
pub mod settings;

use std::path::Path;

use workplan_core::WorkSettings;

/// Settings from `path` if given, else the persisted settings (or defaults).
pub fn load_settings(path: Option<&Path>) -> Result<WorkSettings, Box<dyn std::error::Error>> {
    let settings = match path {
        Some(path) => WorkSettings::load_from(path)?,
        None => WorkSettings::load_or_default()?,
    };
    Ok(settings)
}
