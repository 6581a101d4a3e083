use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use ini::Ini;

use crate::{error::ConfigError, types::ComparisonStrategy};

pub const CONFIG_FILE_NAME: &str = ".replica.conf";
pub const CONFIG_SECTION: &str = "sync";
pub const DEFAULT_INTERVAL_SECONDS: u64 = 60;

/// Raw configuration values, as found in a config file or given on the
/// command line. Layers are merged then validated into a `SyncConfig`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub source: Option<String>,
    pub replica: Option<String>,
    pub interval: Option<String>,
    pub log_file: Option<String>,
    pub comparison: Option<String>,
}

impl ConfigLayer {
    /// Read the user config file (`~/.replica.conf`) if there is one
    pub fn from_env() -> Result<Self, ConfigError> {
        let config_file_path = match default_config_file_path() {
            Some(path) => path,
            None => {
                log::debug!("Unable to determine home folder, ignore config file");
                return Ok(Self::default());
            }
        };

        if !config_file_path.exists() {
            log::debug!("No config file at '{}'", config_file_path.display());
            return Ok(Self::default());
        }

        Self::from_file(&config_file_path)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let config_ini = Ini::load_from_file(path)
            .map_err(|error| ConfigError::ConfigFile(path.to_path_buf(), error.to_string()))?;
        Ok(Self::from_ini(&config_ini))
    }

    pub fn from_ini(config_ini: &Ini) -> Self {
        let section = match config_ini.section(Some(CONFIG_SECTION)) {
            Some(section) => section,
            None => return Self::default(),
        };
        let value = |key: &str| {
            section
                .get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            source: value("source"),
            replica: value("replica"),
            interval: value("interval"),
            log_file: value("log_file"),
            comparison: value("comparison"),
        }
    }

    /// Values of `other` take precedence over values of `self`
    pub fn merge(self, other: ConfigLayer) -> Self {
        Self {
            source: other.source.or(self.source),
            replica: other.replica.or(self.replica),
            interval: other.interval.or(self.interval),
            log_file: other.log_file.or(self.log_file),
            comparison: other.comparison.or(self.comparison),
        }
    }
}

pub fn default_config_file_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub source: PathBuf,
    pub replica: PathBuf,
    pub interval: Duration,
    pub log_file: Option<PathBuf>,
    pub comparison: ComparisonStrategy,
}

impl TryFrom<ConfigLayer> for SyncConfig {
    type Error = ConfigError;

    fn try_from(value: ConfigLayer) -> Result<Self, Self::Error> {
        let raw_source = value.source.ok_or(ConfigError::MissingValue("source"))?;
        let raw_replica = value.replica.ok_or(ConfigError::MissingValue("replica"))?;

        let source = PathBuf::from(&raw_source);
        if !source.exists() {
            return Err(ConfigError::SourceNotFound(source));
        }
        if !source.is_dir() {
            return Err(ConfigError::SourceNotADirectory(source));
        }
        let source = fs::canonicalize(&source).map_err(|error| ConfigError::Io(source, error))?;

        let replica = absolute(Path::new(&raw_replica))?;
        if replica.exists() && !replica.is_dir() {
            return Err(ConfigError::ReplicaNotADirectory(replica));
        }
        if replica.starts_with(&source) || source.starts_with(&replica) {
            return Err(ConfigError::Overlapping(source, replica));
        }

        let interval = match value.interval {
            Some(raw_interval) => parse_interval(&raw_interval)?,
            None => Duration::from_secs(DEFAULT_INTERVAL_SECONDS),
        };
        let comparison = match value.comparison {
            Some(raw_comparison) => raw_comparison.parse()?,
            None => ComparisonStrategy::default(),
        };

        Ok(Self {
            source,
            replica,
            interval,
            log_file: value.log_file.map(PathBuf::from),
            comparison,
        })
    }
}

fn parse_interval(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(seconds) if seconds > 0 => Ok(Duration::from_secs(seconds)),
        _ => Err(ConfigError::InvalidInterval(raw.to_string())),
    }
}

// The replica may not exist yet: canonicalize its closest existing ancestor
// so symlinked parents are resolved the same way as for the source.
fn absolute(path: &Path) -> Result<PathBuf, ConfigError> {
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .map_err(|error| ConfigError::Io(path.to_path_buf(), error))?
            .join(path)
    };

    let mut existing = path.as_path();
    let mut missing = vec![];
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(file_name)) => {
                missing.push(file_name.to_os_string());
                existing = parent;
            }
            _ => return Ok(path),
        }
    }

    let mut resolved =
        fs::canonicalize(existing).map_err(|error| ConfigError::Io(path.clone(), error))?;
    for part in missing.into_iter().rev() {
        resolved.push(part);
    }
    Ok(resolved)
}
