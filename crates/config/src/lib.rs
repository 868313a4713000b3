//! Persistent settings.
//!
//! Settings are layered with [figment]: built-in defaults, then the TOML
//! settings file (which may not exist yet), then `DEBROTHER_*` environment
//! variables. The command line overrides all of these and writes the result
//! back with [`Settings::save`], so the next run starts where the last one
//! left off.

pub mod error;

use crate::error::{ErrorKind, Result};
use debrother_library::{DEFAULT_TEMPLATE, SortPolicy};
use directories::ProjectDirs;
use exn::{OptionExt, ResultExt};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix of the environment variables that override the settings file.
pub const ENV_PREFIX: &str = "DEBROTHER_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory scanned for batch files.
    pub input: PathBuf,
    /// Where renamed files go; the input directory when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    /// Naming template.
    pub pattern: String,
    pub numbering: bool,
    pub flip: bool,
    pub backward_verso: bool,
    pub delete_originals: bool,
}
impl Default for Settings {
    fn default() -> Self {
        Self {
            input: PathBuf::from("."),
            output: None,
            pattern: DEFAULT_TEMPLATE.to_string(),
            numbering: false,
            flip: false,
            backward_verso: false,
            delete_originals: false,
        }
    }
}

impl Settings {
    /// `<platform config dir>/debrother/settings.toml`
    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "debrother").ok_or_raise(|| ErrorKind::ConfigDir)?;
        Ok(dirs.config_dir().join("settings.toml"))
    }

    /// Defaults, overridden by the file at `path` (if it exists), overridden
    /// by the environment.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .or_raise(|| ErrorKind::Load(path.to_path_buf()))?;
        tracing::debug!(path = %path.display(), ?settings, "Loaded settings");
        Ok(settings)
    }

    /// Write the settings as TOML, creating the parent directory if needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let error = || ErrorKind::Save(path.to_path_buf());
        let contents = toml::to_string_pretty(self).or_raise(error)?;
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).or_raise(error)?;
        }
        fs::write(path, contents).or_raise(error)?;
        tracing::debug!(path = %path.display(), "Saved settings");
        Ok(())
    }

    /// Destination directory: `output`, or `input` when that is unset or empty.
    pub fn output_dir(&self) -> &Path {
        self.output.as_deref().filter(|output| !output.as_os_str().is_empty()).unwrap_or(&self.input)
    }

    pub fn policy(&self) -> SortPolicy {
        SortPolicy { numbering: self.numbering, flip: self.flip, backward_verso: self.backward_verso }
    }
}
