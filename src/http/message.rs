//! # Mensajes HTTP
//! src/http/message.rs
//!
//! Modelo de datos compartido por requests y responses.
//!
//! ## Formato
//!
//! ```text
//! GET /index.html HTTP/1.1\r\n      <- start line (request)
//! HTTP/1.1 404 Not Found\r\n        <- start line (response)
//! Header-Name: Header-Value\r\n
//! \r\n
//! body...
//! ```
//!
//! Los headers se guardan en orden de inserción (los duplicados se conservan)
//! y se buscan por nombre exacto sin distinguir mayúsculas.

use std::fmt;

/// Métodos HTTP
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// GET - Obtener un recurso
    GET,

    /// HEAD - Como GET pero solo se envían los headers
    HEAD,

    /// POST - Enviar un formulario
    POST,

    /// Cualquier otro token; el servidor lo rechaza con 405
    Other(String),
}

impl Method {
    /// Convierte el método a string
    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::Other(token) => token,
        }
    }
}

impl From<&str> for Method {
    fn from(token: &str) -> Self {
        match token {
            "GET" => Method::GET,
            "HEAD" => Method::HEAD,
            "POST" => Method::POST,
            other => Method::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Headers HTTP ordenados
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Agrega un header al final, aunque ya exista uno con el mismo nombre
    pub fn append(&mut self, name: &str, value: &str) {
        self.entries.push((name.to_string(), value.to_string()));
    }

    /// Primer valor cuyo nombre coincide (sin distinguir mayúsculas)
    ///
    /// # Ejemplo
    /// ```
    /// use raw_http::http::Headers;
    ///
    /// let mut headers = Headers::new();
    /// headers.append("Content-Length", "12");
    /// assert_eq!(headers.get("content-length"), Some("12"));
    /// assert_eq!(headers.get("Length"), None);
    /// ```
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Primera línea de un mensaje
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartLine {
    /// `METHOD TARGET PROTOCOL`
    Request {
        method: Method,
        target: String,
        version: String,
    },

    /// `PROTOCOL STATUS REASON`
    Status {
        version: String,
        status: u16,
        reason: String,
    },
}

impl fmt::Display for StartLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartLine::Request { method, target, version } => {
                write!(f, "{} {} {}", method, target, version)
            }
            StartLine::Status { version, status, reason } => {
                write!(f, "{} {} {}", version, status, reason)
            }
        }
    }
}

/// Un mensaje HTTP completo (request o response)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub start_line: StartLine,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl Message {
    pub fn new(start_line: StartLine) -> Self {
        Self {
            start_line,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    /// Valor declarado en `Content-Length`, si existe y es un número válido
    pub fn content_length(&self) -> Option<usize> {
        self.headers
            .get("Content-Length")
            .and_then(|v| v.trim().parse().ok())
    }

    /// Destino de redirección (`Location`)
    pub fn location(&self) -> Option<&str> {
        self.headers.get("Location")
    }

    /// Código de estado, solo para responses
    pub fn status(&self) -> Option<u16> {
        match &self.start_line {
            StartLine::Status { status, .. } => Some(*status),
            StartLine::Request { .. } => None,
        }
    }

    /// Start line y headers, una línea por elemento, sin la línea vacía final
    pub fn head_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.headers.len() + 1);
        lines.push(self.start_line.to_string());
        for (name, value) in self.headers.iter() {
            lines.push(format!("{}: {}", name, value));
        }
        lines
    }

    /// Bloque de headers en formato wire, terminado por `\r\n\r\n`
    pub fn head_bytes(&self) -> Vec<u8> {
        let mut result = Vec::new();
        for line in self.head_lines() {
            result.extend_from_slice(line.as_bytes());
            result.extend_from_slice(b"\r\n");
        }
        result.extend_from_slice(b"\r\n");
        result
    }

    /// Mensaje completo en formato wire; el body se copia sin re-codificar
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = self.head_bytes();
        result.extend_from_slice(&self.body);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_from_token() {
        assert_eq!(Method::from("GET"), Method::GET);
        assert_eq!(Method::from("HEAD"), Method::HEAD);
        assert_eq!(Method::from("POST"), Method::POST);
        assert_eq!(Method::from("DELETE"), Method::Other("DELETE".to_string()));
        assert_eq!(Method::from("DELETE").as_str(), "DELETE");
    }

    #[test]
    fn test_headers_case_insensitive_and_ordered() {
        let mut headers = Headers::new();
        headers.append("Set-Cookie", "a=1");
        headers.append("Host", "localhost:8000");
        headers.append("set-cookie", "b=2");

        assert_eq!(headers.get("HOST"), Some("localhost:8000"));
        assert_eq!(headers.get("Set-Cookie"), Some("a=1"));
        let cookies: Vec<(&str, &str)> = headers.iter().filter(|(n, _)| n.eq_ignore_ascii_case("set-cookie")).collect();
        assert_eq!(cookies, vec![("Set-Cookie", "a=1"), ("set-cookie", "b=2")]);
        assert_eq!(headers.len(), 3);
    }

    #[test]
    fn test_header_lookup_is_exact_name() {
        // "X-Content-Length" no debe confundirse con "Content-Length"
        let mut message = Message::new(StartLine::Status {
            version: "HTTP/1.1".to_string(),
            status: 200,
            reason: "OK".to_string(),
        });
        message.headers.append("X-Content-Length", "99");
        message.headers.append("X-Note", "Location: /elsewhere");

        assert_eq!(message.content_length(), None);
        assert_eq!(message.location(), None);
    }

    #[test]
    fn test_to_bytes() {
        let mut message = Message::new(StartLine::Request {
            method: Method::POST,
            target: "/registrasi.html".to_string(),
            version: "HTTP/1.1".to_string(),
        });
        message.headers.append("Host", "localhost:8000");
        message.headers.append("Content-Length", "3");
        message.body = b"a=b".to_vec();

        assert_eq!(
            message.to_bytes(),
            b"POST /registrasi.html HTTP/1.1\r\nHost: localhost:8000\r\nContent-Length: 3\r\n\r\na=b".to_vec()
        );
        assert_eq!(message.content_length(), Some(3));
        assert_eq!(message.status(), None);
    }

    #[test]
    fn test_head_lines() {
        let mut message = Message::new(StartLine::Status {
            version: "HTTP/1.1".to_string(),
            status: 404,
            reason: "Not Found".to_string(),
        });
        message.headers.append("Content-Type", "text/html; charset=UTF-8");

        assert_eq!(
            message.head_lines(),
            vec!["HTTP/1.1 404 Not Found", "Content-Type: text/html; charset=UTF-8"]
        );
        assert_eq!(message.status(), Some(404));
    }
}
