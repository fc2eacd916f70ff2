//! # Cliente HTTP
//! src/client/mod.rs
//!
//! Envía un request, lee la response con el framer e imprime su contenido:
//!
//! - `GET`: texto de la página; sigue la redirección si hay `Location`
//! - `HEAD`: solo los headers, tal cual llegaron; sigue la redirección
//! - `POST`: body de formulario; imprime el texto de la página, sin redirecciones
//!
//! Cada redirección abre una conexión nueva, con el mismo método y protocolo.
//! La cantidad de saltos está acotada por `max_redirects`.
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use raw_http::client::Client;
//! use raw_http::http::Method;
//!
//! let client = Client::new("localhost", 8000);
//! let mut out = std::io::stdout();
//! client.send(&Method::GET, "/", "", &mut out).unwrap();
//! ```

pub mod extract;

use crate::http::builder::{RequestBuilder, FORM_CONTENT_TYPE, HTTP_VERSION};
use crate::http::framer::{self, BodyMode, FramingError};
use crate::http::{Message, Method};
use std::io::{self, Write};
use std::net::TcpStream;
use thiserror::Error;
use tracing::{debug, info};

/// Línea que separa la salida de cada redirección
pub const REDIRECT_MARKER: &str = "===REDIRECTION===";

/// Redirecciones que se siguen por defecto
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

/// Errores del cliente; todos terminan el programa
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("cannot connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot send request: {0}")]
    Send(#[source] io::Error),

    #[error("invalid response: {0}")]
    Framing(#[from] FramingError),

    #[error("too many redirects (limit {0})")]
    TooManyRedirects(usize),

    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error("cannot write output: {0}")]
    Output(#[source] io::Error),
}

/// Cliente para un servidor (host + puerto)
#[derive(Debug, Clone)]
pub struct Client {
    host: String,
    port: u16,
    version: String,
    max_redirects: usize,
}

impl Client {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            version: HTTP_VERSION.to_string(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }

    /// Protocolo que va en la request line (por defecto `HTTP/1.1`)
    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Ejecuta el request (y sus redirecciones) escribiendo la salida en `out`
    ///
    /// Devuelve las responses recibidas, en orden; la última es la final.
    pub fn send<W: Write>(
        &self,
        method: &Method,
        target: &str,
        body: &str,
        out: &mut W,
    ) -> Result<Vec<Message>, ClientError> {
        let follows_redirects = match method {
            Method::GET | Method::HEAD => true,
            Method::POST => false,
            Method::Other(other) => return Err(ClientError::UnsupportedMethod(other.clone())),
        };

        let mut responses = Vec::new();
        let mut target = target.to_string();

        loop {
            let response = self.exchange(method, &target, body)?;
            print_response(method, &response, out)?;

            let next = response
                .location()
                .filter(|_| follows_redirects)
                .map(str::to_string);
            responses.push(response);

            let Some(location) = next else {
                return Ok(responses);
            };
            if responses.len() > self.max_redirects {
                return Err(ClientError::TooManyRedirects(self.max_redirects));
            }

            writeln!(out, "{}", REDIRECT_MARKER).map_err(ClientError::Output)?;
            info!(from = %target, to = %location, "siguiendo redirección");
            target = location;
        }
    }

    /// Una conexión: envía el request y lee la response
    fn exchange(&self, method: &Method, target: &str, body: &str) -> Result<Message, ClientError> {
        let addr = format!("{}:{}", self.host, self.port);
        let mut stream = TcpStream::connect(&addr).map_err(|source| ClientError::Connect {
            addr: addr.clone(),
            source,
        })?;

        let mut builder = RequestBuilder::new(method.clone(), target, &addr).with_version(&self.version);
        if *method == Method::POST {
            builder = builder.with_body(FORM_CONTENT_TYPE, body.as_bytes().to_vec());
        }
        let request = builder.build();

        stream.write_all(&request.to_bytes()).map_err(ClientError::Send)?;
        stream.flush().map_err(ClientError::Send)?;
        debug!(method = %method, target = %target, "request enviado");

        let mode = if *method == Method::HEAD {
            BodyMode::HeadOnly
        } else {
            BodyMode::Complete
        };
        let response = framer::read_response(&mut stream, mode)?;
        debug!(status = ?response.status(), "response recibida");
        Ok(response)
    }
}

fn print_response<W: Write>(method: &Method, response: &Message, out: &mut W) -> Result<(), ClientError> {
    let lines = if *method == Method::HEAD {
        response.head_lines()
    } else {
        extract::text_nodes(&response.body)
    };

    for line in lines {
        writeln!(out, "{}", line).map_err(ClientError::Output)?;
    }
    Ok(())
}
