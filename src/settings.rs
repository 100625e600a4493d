use std::{
    fs,
    path::PathBuf,
};

use anyhow::Context;
use directories::ProjectDirs;
use log::debug;
use serde::Deserialize;

use crate::types::Result;


/// Location of a pseudopotential store on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct FunctionalPath {
    pub directory: PathBuf,
}


/// User configuration, read from `settings.toml` in the platform config
/// directory. Everything is optional; commands fall back to their flag
/// defaults when no file or entry is present.
///
/// ```toml
/// [potcar]
/// directory = "/opt/vasp/potpaw"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    pub potcar: Option<FunctionalPath>,
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "vapack")
            .map(|dirs| dirs.config_dir().join("settings.toml"))
    }

    /// Load the settings file if one exists; an absent file yields defaults.
    pub fn from_default_file() -> Result<Self> {
        let Some(path) = Self::config_path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            debug!("No settings file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)
            .context(format!("Failed to read settings file {:?}", path))?;
        let settings = toml::from_str(&content)
            .context(format!("Failed to parse settings file {:?}", path))?;
        Ok(settings)
    }
}
