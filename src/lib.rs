//! # raw_http
//! src/lib.rs
//!
//! Cliente y servidor HTTP/1.1 mínimos, escritos directamente sobre sockets
//! TCP bloqueantes (sin frameworks HTTP).
//!
//! ## Arquitectura
//!
//! - `http`: mensajes, framing (lectura desde el socket) y construcción de bytes
//! - `store`: acceso a los archivos servidos y tabla de MIME types
//! - `router`: decide la respuesta de cada request
//! - `server`: acceptor, cola de despacho y worker de respuestas
//! - `client`: envía un request e imprime la respuesta
//! - `config`: archivo de configuración y argumentos de línea de comandos
//! - `logging`: subscriber de tracing
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use raw_http::config::ServerConfig;
//! use raw_http::server::Server;
//! use raw_http::store::DirStore;
//!
//! let config = ServerConfig::parse("[localhost]\nPort=8000\n").unwrap();
//! let server = Server::bind(&config, DirStore::new(".")).unwrap();
//! server.run().unwrap();
//! ```

pub mod client;
pub mod config;
pub mod http;
pub mod logging;
pub mod router;
pub mod server;
pub mod store;
