//! Server configuration from environment variables.

use std::path::PathBuf;

use thiserror::Error;

/// Default location of the bundled city reference file.
pub const DEFAULT_CITIES_KML_PATH: &str = "assets/Cities.kml";

/// Errors raised while reading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("{name} environment variable not set")]
    Missing {
        /// Variable name.
        name: &'static str,
    },
}

/// Where user documents are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// The hosted Realtime Database.
    Firebase {
        /// Database root URL.
        url: String,
        /// Optional `auth` query token.
        auth_token: Option<String>,
    },
    /// An in-process store, optionally seeded from a JSON file.
    Memory {
        /// JSON file loaded as the store root at startup.
        seed_path: Option<PathBuf>,
    },
}

/// Everything the server needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind (`BIND_ADDR`, default `127.0.0.1`).
    pub bind_addr: String,
    /// Port to bind (`PORT`, default `8080`).
    pub port: u16,
    /// Document store backend.
    pub store: StoreBackend,
    /// City reference file (`CITIES_KML_PATH`).
    pub cities_kml_path: PathBuf,
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if `FIREBASE_DATABASE_URL` is unset
    /// and the memory store is not enabled.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value of
    /// a variable if it is set.
    ///
    /// `KINTR_MEMORY_STORE=1` (or `true`) selects the in-memory store,
    /// seeded from `KINTR_SEED_PATH` when given. Otherwise
    /// `FIREBASE_DATABASE_URL` is required and `FIREBASE_AUTH_TOKEN` is
    /// optional.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if a required variable is unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_addr = non_empty("BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string());
        let port: u16 = non_empty("PORT")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(8080);

        let memory = non_empty("KINTR_MEMORY_STORE")
            .is_some_and(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"));

        let store = if memory {
            StoreBackend::Memory {
                seed_path: non_empty("KINTR_SEED_PATH").map(PathBuf::from),
            }
        } else {
            StoreBackend::Firebase {
                url: non_empty("FIREBASE_DATABASE_URL").ok_or(ConfigError::Missing {
                    name: "FIREBASE_DATABASE_URL",
                })?,
                auth_token: non_empty("FIREBASE_AUTH_TOKEN"),
            }
        };

        let cities_kml_path = non_empty("CITIES_KML_PATH")
            .map_or_else(|| PathBuf::from(DEFAULT_CITIES_KML_PATH), PathBuf::from);

        Ok(Self {
            bind_addr,
            port,
            store,
            cities_kml_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn firebase_defaults() {
        let config = config(&[("FIREBASE_DATABASE_URL", "https://kintr.firebaseio.com")]).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.cities_kml_path, PathBuf::from(DEFAULT_CITIES_KML_PATH));
        assert_eq!(
            config.store,
            StoreBackend::Firebase {
                url: "https://kintr.firebaseio.com".to_string(),
                auth_token: None,
            }
        );
    }

    #[test]
    fn database_url_is_required() {
        assert!(matches!(
            config(&[]),
            Err(ConfigError::Missing {
                name: "FIREBASE_DATABASE_URL"
            })
        ));
        assert!(config(&[("FIREBASE_DATABASE_URL", "  ")]).is_err());
    }

    #[test]
    fn memory_store_needs_no_url() {
        let config = config(&[
            ("KINTR_MEMORY_STORE", "true"),
            ("KINTR_SEED_PATH", "seed.json"),
            ("PORT", "9000"),
            ("BIND_ADDR", "0.0.0.0"),
            ("CITIES_KML_PATH", "/data/Cities.kml"),
        ])
        .unwrap();
        assert_eq!(
            config.store,
            StoreBackend::Memory {
                seed_path: Some(PathBuf::from("seed.json"))
            }
        );
        assert_eq!(config.port, 9000);
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.cities_kml_path, PathBuf::from("/data/Cities.kml"));
    }

    #[test]
    fn invalid_port_falls_back() {
        let config = config(&[("KINTR_MEMORY_STORE", "1"), ("PORT", "http")]).unwrap();
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn auth_token_is_passed_through() {
        let config = config(&[
            ("FIREBASE_DATABASE_URL", "https://kintr.firebaseio.com"),
            ("FIREBASE_AUTH_TOKEN", "secret"),
        ])
        .unwrap();
        assert!(matches!(
            config.store,
            StoreBackend::Firebase { auth_token: Some(ref t), .. } if t == "secret"
        ));
    }
}
