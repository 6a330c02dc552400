//! Application settings and the HTTP server configuration built from them.

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};

use actix_web::cookie::{Key, SameSite};
use cap_std::{ambient_authority, fs::Dir};
use mindtrack::outbound::persistence::DbPool;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";
/// Smallest key file accepted by [`Key::derive_from`].
const SESSION_KEY_MIN_BYTES: usize = 32;

/// Settings read from `MINDTRACK_*` environment variables and CLI flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "MINDTRACK")]
pub struct AppSettings {
    /// Interface to bind.
    pub host: Option<String>,
    /// TCP port to bind.
    pub port: Option<u16>,
    /// PostgreSQL URL. Without one the server keeps data in memory.
    pub database_url: Option<String>,
    /// Largest number of pooled database connections.
    pub db_max_connections: Option<u32>,
    /// File holding the session signing and encryption key material.
    pub session_key_file: Option<PathBuf>,
    /// Mark the session cookie `Secure`. Defaults to on.
    pub cookie_secure: Option<bool>,
    /// Allow a random session key when the key file cannot be read.
    #[ortho_config(default = false)]
    pub allow_ephemeral_session_key: bool,
    /// Apply embedded migrations on startup. Defaults to on.
    pub run_migrations: Option<bool>,
}

/// Startup failures while turning settings into a server configuration.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The bind address did not resolve.
    #[error("cannot resolve bind address {host}:{port}: {source}")]
    BindAddress {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },
    /// The session key file is unusable and ephemeral keys are not allowed.
    #[error("failed to read session key at {path}: {source}")]
    SessionKey {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AppSettings {
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure.unwrap_or(true)
    }

    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }

    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    /// Resolve the first socket address for the configured host and port.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let (host, port) = (self.host(), self.port());
        let to_error = |source| SettingsError::BindAddress {
            host: host.to_owned(),
            port,
            source,
        };
        (host, port)
            .to_socket_addrs()
            .map_err(to_error)?
            .next()
            .ok_or_else(|| {
                to_error(std::io::Error::new(
                    std::io::ErrorKind::AddrNotAvailable,
                    "no addresses resolved",
                ))
            })
    }

    /// Load the session key, falling back to a random key in debug builds or
    /// when ephemeral keys are explicitly allowed.
    pub fn session_key(&self) -> Result<Key, SettingsError> {
        let path = self.session_key_file();
        match read_key_material(&path) {
            Ok(bytes) => Ok(Key::derive_from(&bytes)),
            Err(source) if cfg!(debug_assertions) || self.allow_ephemeral_session_key => {
                warn!(path = %path.display(), error = %source, "using temporary session key (dev only)");
                Ok(Key::generate())
            }
            Err(source) => Err(SettingsError::SessionKey { path, source }),
        }
    }
}

fn read_key_material(path: &Path) -> std::io::Result<Vec<u8>> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path.file_name().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "session key path must be a file",
        )
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    let bytes = dir.read(Path::new(file_name))?;
    if bytes.len() < SESSION_KEY_MIN_BYTES {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("session key must be at least {SESSION_KEY_MIN_BYTES} bytes"),
        ));
    }
    Ok(bytes)
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
        }
    }

    /// Attach a database pool; the server then uses the Diesel adapters
    /// instead of the in-memory store.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
