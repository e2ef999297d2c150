use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::{
    avatar::{AvatarIngestor, DEFAULT_MAX_AVATAR_BYTES},
    fs::config_dir,
    repository::entities::{ProfileFields, UserId},
    validation::NumberPolicy,
};

const CURRENT_CONFIG_VERSION: u16 = 1;
const FILE_NAME: &str = "core.toml";

/// Handle to the core configuration
pub type Cfg = Arc<RwLock<CoreConfig>>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access configuration file: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// The core configuration, serialized to TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    version: u16,
    pub session: SessionConfig,
    pub fleet: FleetConfig,
    pub validation: ValidationConfig,
    pub avatar: AvatarConfig,
    pub logging: LoggingConfig,
}

/// The local user a session signs in as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub user_id: String,
    pub display_name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// Fill an empty database with a few demonstration vehicles.
    pub seed_sample_data: bool,
    /// How many vehicles the overview lists under recent activity.
    pub recent_activity: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub numbers: NumberPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarConfig {
    pub max_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_CONFIG_VERSION,
            session: SessionConfig::default(),
            fleet: FleetConfig::default(),
            validation: ValidationConfig::default(),
            avatar: AvatarConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_id: "local".into(),
            display_name: String::new(),
            email: String::new(),
        }
    }
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            seed_sample_data: true,
            recent_activity: 3,
        }
    }
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_AVATAR_BYTES,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".into(),
        }
    }
}

impl CoreConfig {
    /// Default location of the configuration file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(config_dir()?.join(FILE_NAME))
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Read the configuration at `path`. A missing file is created with the defaults and an
    /// unreadable one is replaced by the defaults in memory only.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            Ok(toml::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring invalid configuration at {}: {err}", path.display());
                Self::default()
            }))
        } else {
            let cfg = Self::default();
            cfg.save_to(path)?;
            Ok(cfg)
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, contents)?;

        Ok(())
    }

    pub fn version(&self) -> u16 {
        self.version
    }

    pub fn user_id(&self) -> UserId {
        UserId::from(self.session.user_id.as_str())
    }

    /// Profile used for the local user until they save their own.
    pub fn default_profile(&self) -> ProfileFields {
        ProfileFields {
            name: self.session.display_name.clone(),
            email: self.session.email.clone(),
            ..Default::default()
        }
    }

    pub fn avatar_ingestor(&self) -> AvatarIngestor {
        AvatarIngestor::new(self.avatar.max_bytes)
    }

    #[cfg(test)]
    pub(crate) fn mock() -> Self {
        Self::default()
    }
}
