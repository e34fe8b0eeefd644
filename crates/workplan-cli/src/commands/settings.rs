use std::path::PathBuf;

use clap::Subcommand;
use workplan_core::WorkSettings;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the effective settings as TOML
    Show {
        /// Settings file (defaults to the persisted settings)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Print the default settings path
    Path,
    /// Write default settings
    Reset {
        /// Target file (defaults to the persisted settings path)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Check settings for malformed windows, budgets and blocked time
    Validate {
        /// Settings file (defaults to the persisted settings)
        path: Option<PathBuf>,
    },
}

pub fn run(action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SettingsAction::Show { path } => {
            let settings = super::load_settings(path.as_deref())?;
            print!("{}", toml::to_string_pretty(&settings)?);
        }
        SettingsAction::Path => {
            println!("{}", WorkSettings::path()?.display());
        }
        SettingsAction::Reset { path } => {
            let settings = WorkSettings::default();
            match path {
                Some(path) => settings.save_to(&path)?,
                None => settings.save()?,
            }
            println!("settings reset to defaults");
        }
        SettingsAction::Validate { path } => {
            let settings = super::load_settings(path.as_deref())?;
            let errors = settings.validate();
            if errors.is_empty() {
                println!("ok");
            } else {
                for err in &errors {
                    eprintln!("{err}");
                }
                return Err(format!("{} problem(s) found", errors.len()).into());
            }
        }
    }
    Ok(())
}
