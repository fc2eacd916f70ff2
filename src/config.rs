//! # Configuración
//! src/config.rs
//!
//! - [`ServerArgs`]: flags del servidor (todos opcionales; sin argumentos se
//!   lee `httpserver.conf` del directorio actual).
//! - [`ServerConfig`]: host y puerto leídos del archivo de configuración.
//! - [`ClientArgs`]: argumentos del cliente.
//!
//! ## Archivo de configuración
//!
//! ```text
//! [localhost]
//! Port=8000
//! ```
//!
//! La sección `localhost` es obligatoria; `Host="0.0.0.0"` opcionalmente cambia
//! la dirección de bind (por defecto es el nombre de la sección).
//!
//! ## Ejemplos de uso
//!
//! ```bash
//! ./server --config /etc/httpserver.conf --root ./www
//! HTTP_SERVER_ROOT=./www ./server
//! ./client localhost 8000 --method POST --urn /registrasi.html --body "email=a@b.com&password=x"
//! ```

use crate::client::DEFAULT_MAX_REDIRECTS;
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Archivo de configuración por defecto
pub const CONF_FILE: &str = "httpserver.conf";

/// Sección del archivo de configuración que usa el servidor
pub const HOST_SECTION: &str = "localhost";

/// Errores al cargar la configuración (fatales al iniciar)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing [{0}] section")]
    MissingSection(String),

    #[error("invalid [{section}] section: {source}")]
    InvalidSection {
        section: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Flags del servidor
#[derive(Debug, Clone, Parser)]
#[command(name = "server")]
#[command(about = "Servidor HTTP/1.1 minimo sobre sockets TCP")]
#[command(version)]
pub struct ServerArgs {
    /// Archivo de configuración con la sección [localhost]
    #[arg(long, default_value = CONF_FILE, env = "HTTP_SERVER_CONF")]
    pub config: PathBuf,

    /// Directorio de los archivos servidos
    #[arg(long, default_value = ".", env = "HTTP_SERVER_ROOT")]
    pub root: PathBuf,
}

/// Argumentos del cliente
#[derive(Debug, Clone, Parser)]
#[command(name = "client")]
#[command(about = "HTTP client for one request")]
#[command(version)]
pub struct ClientArgs {
    /// HTTP server host
    #[arg(default_value = "localhost")]
    pub host: String,

    /// HTTP server port
    #[arg(default_value_t = 8000)]
    pub port: u16,

    /// HTTP request method (GET, HEAD, POST)
    #[arg(long, default_value = "GET")]
    pub method: String,

    /// HTTP request urn
    #[arg(long, default_value = "/")]
    pub urn: String,

    /// HTTP request protocol
    #[arg(long, default_value = "HTTP/1.1")]
    pub protocol: String,

    /// HTTP request body
    #[arg(long, default_value = "")]
    pub body: String,

    /// Máximo de redirecciones a seguir
    #[arg(long = "max-redirects", default_value_t = DEFAULT_MAX_REDIRECTS)]
    pub max_redirects: usize,
}

/// Dirección en la que escucha el servidor; inmutable después de cargarse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
struct HostSection {
    #[serde(rename = "Port", alias = "port")]
    port: u16,

    #[serde(rename = "Host", alias = "host", default)]
    host: Option<String>,
}

impl ServerConfig {
    /// Lee y valida el archivo de configuración
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parsea el contenido del archivo de configuración
    ///
    /// # Ejemplo
    /// ```
    /// use raw_http::config::ServerConfig;
    ///
    /// let config = ServerConfig::parse("[localhost]\nPort=8000\n").unwrap();
    /// assert_eq!(config.address(), "localhost:8000");
    /// ```
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(content)?;

        let section = table
            .get(HOST_SECTION)
            .cloned()
            .ok_or_else(|| ConfigError::MissingSection(HOST_SECTION.to_string()))?;
        let section = section.try_into::<HostSection>().map_err(|source| ConfigError::InvalidSection {
            section: HOST_SECTION.to_string(),
            source,
        })?;

        Ok(Self {
            host: section.host.unwrap_or_else(|| HOST_SECTION.to_string()),
            port: section.port,
        })
    }

    /// Dirección completa para bind (host:port)
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
