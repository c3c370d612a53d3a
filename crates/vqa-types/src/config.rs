use std::{collections::HashSet, fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::{screen::Screen, Result, VqaError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Design exports, one `<name>.png` per screen.
    pub reference_dir: String,
    /// Game screenshots, one `<name>.png` per screen.
    pub captured_dir: String,
    pub reports_dir: String,
}

impl PathsConfig {
    pub fn resolve(&self, name: &str) -> Screen {
        Screen::resolve(
            name,
            Path::new(&self.reference_dir),
            Path::new(&self.captured_dir),
        )
    }

    pub fn reports_dir(&self) -> PathBuf {
        PathBuf::from(&self.reports_dir)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareConfig {
    /// Number of screens compared at the same time.
    pub concurrency: usize,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpsConfig {
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaConfig {
    pub paths: PathsConfig,
    #[serde(default)]
    pub compare: CompareConfig,
    pub ops: OpsConfig,
    pub screens: Vec<String>,
}

impl QaConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref).map_err(|err| {
            VqaError::Configuration(format!(
                "unable to read config file {}: {err}",
                path_ref.display()
            ))
        })?;
        toml::from_str(&contents).map_err(|err| {
            VqaError::Configuration(format!(
                "failed to parse config file {}: {err}",
                path_ref.display()
            ))
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.screens.is_empty() {
            return Err(VqaError::Configuration(
                "screens must list at least one screen".into(),
            ));
        }
        let mut seen = HashSet::new();
        for name in &self.screens {
            validate_screen_name(name)?;
            if !seen.insert(name.as_str()) {
                return Err(VqaError::Configuration(format!(
                    "screen '{name}' is listed more than once"
                )));
            }
        }
        for (key, value) in [
            ("paths.reference_dir", &self.paths.reference_dir),
            ("paths.captured_dir", &self.paths.captured_dir),
            ("paths.reports_dir", &self.paths.reports_dir),
        ] {
            if value.trim().is_empty() {
                return Err(VqaError::Configuration(format!("{key} must not be empty")));
            }
        }
        if self.compare.concurrency == 0 {
            return Err(VqaError::Configuration(
                "compare.concurrency must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Screen names double as file stems, so they cannot contain path separators.
pub fn validate_screen_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(VqaError::Configuration("screen names must not be empty".into()));
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(VqaError::Configuration(format!(
            "screen name '{name}' must not contain path separators"
        )));
    }
    Ok(())
}
