//! # Módulo HTTP
//!
//! Implementa el framing HTTP/1.1 directamente sobre sockets, sin usar
//! librerías de alto nivel:
//!
//! - Modelo de mensajes (start line, headers ordenados, body)
//! - Framing de mensajes leídos desde un stream
//! - Construcción de requests y responses
//! - Códigos de estado
//!
//! ## Simplificaciones del protocolo
//!
//! - Una sola request por conexión (sin keep-alive ni pipelining)
//! - Sin chunked transfer encoding: el body se delimita solo con
//!   `Content-Length`
//! - Sin TLS

pub mod builder; // Construcción de requests y responses
pub mod framer; // Lectura de mensajes desde un stream
pub mod message; // Modelo de datos
pub mod status; // Códigos de estado HTTP

// Re-exportamos los tipos principales para facilitar su uso
pub use builder::{RequestBuilder, ResponseBuilder};
pub use framer::{BodyMode, FramingError};
pub use message::{Headers, Message, Method, StartLine};
pub use status::StatusCode;
