use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Error;

const CONFIG_FILE: &str = "kolmarket";
const ENV_PREFIX: &str = "KOLMARKET";

#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub log: LogSettings,
    /// Fill an empty store with demo records on startup.
    pub seed: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    File,
    Mongodb,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub directory: String,
    pub mongodb_uri: String,
    pub mongodb_database: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LogSettings {
    /// An `EnvFilter` directive, e.g. `"info,kolmarket=debug"`.
    pub filter: String,
}

impl Settings {
    /// Defaults, then `kolmarket.toml` if present, then `KOLMARKET__*`
    /// environment variables such as `KOLMARKET__SERVER__PORT`.
    pub fn load() -> Result<Settings, Error> {
        Settings::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(file: &Path) -> Result<Settings, Error> {
        let config = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("storage.backend", "file")?
            .set_default("storage.directory", "data")?
            .set_default("storage.mongodb_uri", "mongodb://localhost:27017")?
            .set_default("storage.mongodb_database", "kolmarket")?
            .set_default("log.filter", "info")?
            .set_default("seed", false)?
            .add_source(File::from(file).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_a_file() {
        let dir = tempfile::tempdir().unwrap();

        let settings = Settings::load_from(&dir.path().join("absent")).unwrap();

        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.storage.backend, StorageBackend::File);
        assert!(!settings.seed);
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kolmarket.toml");
        std::fs::write(
            &path,
            "seed = true\n[server]\nport = 9000\n[storage]\nbackend = \"memory\"\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();

        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.storage.backend, StorageBackend::Memory);
        assert!(settings.seed);
    }

    #[test]
    fn unknown_backend_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kolmarket.toml");
        std::fs::write(&path, "[storage]\nbackend = \"redis\"\n").unwrap();

        let result = Settings::load_from(&path);

        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }
}
