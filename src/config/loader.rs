//! Loading rule profiles from TOML.

use crate::config::schema::{Preset, RuleProfile, ValidationError};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Where a profile's text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileOrigin {
    Inline,
    File(PathBuf),
}

impl fmt::Display for ProfileOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileOrigin::Inline => f.write_str("<inline>"),
            ProfileOrigin::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read rule profile {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("rule profile {origin} is not valid TOML: {source}")]
    Syntax {
        origin: ProfileOrigin,
        #[source]
        source: toml_edit::de::Error,
    },

    #[error("rule profile {origin} rejected: {source}")]
    Invalid {
        origin: ProfileOrigin,
        #[source]
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn origin(&self) -> ProfileOrigin {
        match self {
            ConfigError::Read { path, .. } => ProfileOrigin::File(path.clone()),
            ConfigError::Syntax { origin, .. } | ConfigError::Invalid { origin, .. } => {
                origin.clone()
            }
        }
    }
}

fn parse_profile(text: &str, origin: ProfileOrigin) -> Result<RuleProfile, ConfigError> {
    let profile: RuleProfile = match toml_edit::de::from_str(text) {
        Ok(profile) => profile,
        Err(source) => return Err(ConfigError::Syntax { origin, source }),
    };
    if let Err(source) = profile.validate() {
        return Err(ConfigError::Invalid { origin, source });
    }
    debug!(%origin, rules = ?profile.rules, "loaded rule profile");
    Ok(profile)
}

/// Parse and validate a profile held in memory.
pub fn load_from_str(text: &str) -> Result<RuleProfile, ConfigError> {
    parse_profile(text, ProfileOrigin::Inline)
}

/// Read, parse and validate a profile file.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RuleProfile, ConfigError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_profile(&text, ProfileOrigin::File(path.to_path_buf()))
}

/// The profile file if one is given, otherwise the preset's defaults.
pub fn resolve_profile(file: Option<&Path>, preset: Preset) -> Result<RuleProfile, ConfigError> {
    match file {
        Some(path) => load_from_path(path),
        None => Ok(RuleProfile::preset(preset)),
    }
}
