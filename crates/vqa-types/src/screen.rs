use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A named screen with its resolved pair of source images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    pub name: String,
    /// Design-tool export.
    pub reference_path: PathBuf,
    /// Screenshot produced by the running game.
    pub captured_path: PathBuf,
}

impl Screen {
    /// Resolves `<dir>/<name>.png` for both sources.
    pub fn resolve(name: &str, reference_dir: &Path, captured_dir: &Path) -> Self {
        let file = format!("{name}.png");
        Self {
            name: name.to_string(),
            reference_path: reference_dir.join(&file),
            captured_path: captured_dir.join(file),
        }
    }

    /// Diff visualisation path, named after the captured image.
    pub fn diff_image_path(&self, reports_dir: &Path) -> PathBuf {
        let stem = self
            .captured_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone());
        reports_dir.join(format!("diff_{stem}.png"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_by_name_convention() {
        let screen = Screen::resolve("LogoScreen", Path::new("figma"), Path::new("unity"));
        assert_eq!(screen.reference_path, Path::new("figma/LogoScreen.png"));
        assert_eq!(screen.captured_path, Path::new("unity/LogoScreen.png"));
        assert_eq!(
            screen.diff_image_path(Path::new("reports")),
            Path::new("reports/diff_LogoScreen.png")
        );
    }
}
