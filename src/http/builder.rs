//! # Construcción de Mensajes HTTP
//! src/http/builder.rs
//!
//! Arma los bytes exactos de un request o una response. Ambos builders
//! producen un [`Message`]; `Message::to_bytes` lo serializa.
//!
//! ## Headers de un request
//!
//! ```text
//! POST /registrasi.html HTTP/1.1\r\n
//! Host: localhost:8000\r\n
//! Content-Type: application/x-www-form-urlencoded\r\n
//! Content-Length: 31\r\n
//! Date: Sun, 06 Nov 1994 08:49:37 GMT\r\n
//! \r\n
//! ```
//!
//! ## Headers de una response
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/html; charset=UTF-8\r\n
//! Content-Length: 512\r\n
//! Date: Sun, 06 Nov 1994 08:49:37 GMT\r\n
//! \r\n
//! ```
//!
//! ## Ejemplo de uso
//!
//! ```
//! use raw_http::http::{ResponseBuilder, StatusCode};
//!
//! let message = ResponseBuilder::new(StatusCode::Ok)
//!     .with_content("text/plain", b"hola".to_vec())
//!     .build();
//!
//! let bytes = message.to_bytes();
//! assert!(bytes.starts_with(b"HTTP/1.1 200 OK\r\n"));
//! ```

use super::message::{Message, Method, StartLine};
use super::StatusCode;
use chrono::{DateTime, Utc};

/// Versión de protocolo que usa el servidor en sus responses
pub const HTTP_VERSION: &str = "HTTP/1.1";

/// Content type de los formularios que envía el cliente
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Formatea una fecha como HTTP-date (RFC 1123)
///
/// # Ejemplo
/// ```
/// use chrono::{TimeZone, Utc};
/// use raw_http::http::builder::http_date;
///
/// let date = Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap();
/// assert_eq!(http_date(date), "Sun, 06 Nov 1994 08:49:37 GMT");
/// ```
pub fn http_date(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Builder de requests del cliente
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    target: String,
    version: String,
    host: String,
    content_type: Option<String>,
    body: Vec<u8>,
}

impl RequestBuilder {
    /// `host` es el valor del header `Host` (normalmente `host:port`)
    pub fn new(method: Method, target: &str, host: &str) -> Self {
        Self {
            method,
            target: target.to_string(),
            version: HTTP_VERSION.to_string(),
            host: host.to_string(),
            content_type: None,
            body: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    /// Adjunta un body con su content type
    ///
    /// `Content-Length` solo se emite si el body no está vacío.
    pub fn with_body(mut self, content_type: &str, body: Vec<u8>) -> Self {
        self.content_type = Some(content_type.to_string());
        self.body = body;
        self
    }

    pub fn build(&self) -> Message {
        self.build_at(Utc::now())
    }

    /// Igual que [`build`](Self::build) pero con la fecha dada
    pub fn build_at(&self, now: DateTime<Utc>) -> Message {
        let mut message = Message::new(StartLine::Request {
            method: self.method.clone(),
            target: self.target.clone(),
            version: self.version.clone(),
        });

        message.headers.append("Host", &self.host);
        if let Some(content_type) = &self.content_type {
            message.headers.append("Content-Type", content_type);
        }
        if !self.body.is_empty() {
            message.headers.append("Content-Length", &self.body.len().to_string());
        }
        message.headers.append("Date", &http_date(now));
        message.body = self.body.clone();

        message
    }
}

/// Builder de responses del servidor
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    status: StatusCode,
    content_type: String,
    location: Option<String>,
    body: Vec<u8>,
}

impl ResponseBuilder {
    /// Response vacía de tipo `text/html`
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            content_type: "text/html".to_string(),
            location: None,
            body: Vec::new(),
        }
    }

    /// Establece el body; el contenido binario se copia tal cual
    pub fn with_content(mut self, content_type: &str, body: Vec<u8>) -> Self {
        self.content_type = content_type.to_string();
        self.body = body;
        self
    }

    /// Agrega el header `Location`
    pub fn with_location(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }

    pub fn build(&self) -> Message {
        self.build_at(Utc::now())
    }

    pub fn build_at(&self, now: DateTime<Utc>) -> Message {
        let mut message = Message::new(StartLine::Status {
            version: HTTP_VERSION.to_string(),
            status: self.status.as_u16(),
            reason: self.status.reason_phrase().to_string(),
        });

        message
            .headers
            .append("Content-Type", &format!("{}; charset=UTF-8", self.content_type));
        message.headers.append("Content-Length", &self.body.len().to_string());
        message.headers.append("Date", &http_date(now));
        if let Some(location) = &self.location {
            message.headers.append("Location", location);
        }
        message.body = self.body.clone();

        message
    }
}
