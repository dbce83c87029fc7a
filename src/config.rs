//! Configuration file.
//!
//! ```toml
//! dialect = "oracle"
//! like_variant = "likec"
//! use_tz = true
//!
//! [[schema.tables]]
//! name = "things"
//! columns = [
//!     { name = "id", type = "integer", primary_key = true },
//!     { name = "value", type = "json", nullable = true },
//! ]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sqljson_core::error::JsonError;
use sqljson_core::prelude::{Connection, Dialect, LikeVariant, Schema};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit(PathBuf),
    DefaultFile(PathBuf),
    Defaults,
}

impl ConfigSource {
    pub fn label(&self) -> String {
        match self {
            ConfigSource::Explicit(path) | ConfigSource::DefaultFile(path) => {
                path.display().to_string()
            }
            ConfigSource::Defaults => "built-in defaults".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawConfig")]
pub struct Config {
    pub dialect: Dialect,
    /// The MySQL server is MariaDB.
    pub mariadb: bool,
    /// Oracle LIKE form, normally detected from the server.
    pub like_variant: LikeVariant,
    /// Store Oracle timestamps in UTC.
    pub use_tz: bool,
    pub schema: Schema,
}

/// The file as written; the dialect name is kept so `mariadb` can set the
/// MariaDB flag.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    dialect: Option<String>,
    mariadb: bool,
    like_variant: LikeVariant,
    use_tz: bool,
    schema: Schema,
}

impl TryFrom<RawConfig> for Config {
    type Error = JsonError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let mut config = Config {
            dialect: Dialect::default(),
            mariadb: raw.mariadb,
            like_variant: raw.like_variant,
            use_tz: raw.use_tz,
            schema: raw.schema,
        };
        if let Some(name) = raw.dialect {
            config.set_dialect(&name)?;
        }
        Ok(config)
    }
}

impl Config {
    /// Select a dialect by name; `mariadb` is MySQL with the MariaDB flag.
    pub fn set_dialect(&mut self, name: &str) -> Result<(), JsonError> {
        self.dialect = name.parse()?;
        self.mariadb |= name.eq_ignore_ascii_case("mariadb");
        Ok(())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `<config dir>/sqljson/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sqljson").join("config.toml"))
    }

    /// Load `explicit`, else the default file, else defaults. An explicit
    /// path must exist.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigSource), ConfigError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            let config = Self::from_file(path)?;
            return Ok((config, ConfigSource::Explicit(path.to_path_buf())));
        }

        if let Some(path) = Self::default_path().filter(|p| p.exists()) {
            let config = Self::from_file(&path)?;
            return Ok((config, ConfigSource::DefaultFile(path)));
        }

        Ok((Self::default(), ConfigSource::Defaults))
    }

    /// Compilation target described by this configuration.
    pub fn connection(&self) -> Connection {
        let mut conn = Connection::new(self.dialect);
        match self.dialect {
            Dialect::MySql => conn.features.mysql_is_mariadb = self.mariadb,
            Dialect::Oracle => conn.features.like_variant = self.like_variant,
            Dialect::Postgres | Dialect::Sqlite => {}
        }
        conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_config(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_explicit_file() {
        let file = write_config(
            r#"
dialect = "oracle"
like_variant = "likec"
use_tz = true

[[schema.tables]]
name = "things"
columns = [
    { name = "id", type = "integer", primary_key = true },
    { name = "value", type = "json", nullable = true },
]
"#,
        );
        let (config, source) = Config::load(Some(file.path())).unwrap();
        assert_eq!(source, ConfigSource::Explicit(file.path().to_path_buf()));
        assert_eq!(config.dialect, Dialect::Oracle);
        assert!(config.use_tz);
        assert_eq!(config.connection().features.like_variant, LikeVariant::Likec);

        let column = config.schema.resolve_column("things", "value").unwrap();
        assert!(column.is_json());
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let file = write_config("mariadb = true\n");
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.dialect, Dialect::Postgres);
        assert!(config.schema.tables.is_empty());
        // only meaningful for MySQL
        assert!(!config.connection().features.mysql_is_mariadb);
    }

    #[test]
    fn test_mariadb_connection() {
        let file = write_config("dialect = \"mysql\"\nmariadb = true\n");
        let config = Config::from_file(file.path()).unwrap();
        assert!(config.connection().features.mysql_is_mariadb);
    }

    #[test]
    fn test_mariadb_dialect_name_sets_flag() {
        let file = write_config("dialect = \"mariadb\"\n");
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.dialect, Dialect::MySql);
        assert!(config.mariadb);
        assert!(config.connection().features.mysql_is_mariadb);

        let file = write_config("dialect = \"MySQL\"\n");
        let config = Config::from_file(file.path()).unwrap();
        assert!(!config.connection().features.mysql_is_mariadb);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            Config::load(Some(&missing)),
            Err(ConfigError::NotFound(_))
        ));
    }

    #[test]
    fn test_invalid_toml() {
        let file = write_config("dialect = \"db2\"\n");
        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_default_path_location() {
        if let Some(path) = Config::default_path() {
            assert!(path.ends_with("sqljson/config.toml"));
        }
    }
}
