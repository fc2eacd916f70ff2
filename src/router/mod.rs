//! # Route Resolver
//! src/router/mod.rs
//!
//! Decide la respuesta para cada request a partir de una tabla fija de reglas.
//!
//! ## Arquitectura
//!
//! ```text
//! (method, target, body) → Resolver → RouteOutcome → ResponseBuilder
//! ```
//!
//! | Método     | Target                      | Resultado                    |
//! |------------|-----------------------------|------------------------------|
//! | GET/HEAD   | `index.htm`, `registrasi`   | 301 hacia la página canónica |
//! | GET/HEAD   | página servible existente   | 200 con el archivo           |
//! | GET/HEAD   | `private.html` existente    | 403                          |
//! | POST       | `registrasi.html` existente | 200 o 400 según el form      |
//! | GET/POST   | cualquier otro              | 404                          |
//! | otro       | cualquiera                  | 405                          |
//!
//! Los errores de ruteo nunca se propagan: siempre terminan en una response.

pub mod html;

use crate::http::{Message, Method, ResponseBuilder, StatusCode};
use crate::store::{guess_mime, FileStore};
use thiserror::Error;
use tracing::warn;

/// Página servida para el target vacío o `/`
pub const INDEX_PAGE: &str = "index.html";

/// Únicos archivos que se sirven con GET
pub const SERVABLE_PAGES: &[&str] = &[INDEX_PAGE, FORM_ENDPOINT];

/// Página que existe pero no se puede ver
pub const RESTRICTED_PAGE: &str = "private.html";

/// Destino del formulario de registro
pub const FORM_ENDPOINT: &str = "registrasi.html";

/// Página 404 estática opcional
pub const NOT_FOUND_PAGE: &str = "404.html";

/// Alias legados → página canónica
pub const REDIRECTS: &[(&str, &str)] = &[("index.htm", "/index.html"), ("registrasi", "/registrasi.html")];

const DEFAULT_CONTENT_TYPE: &str = "text/html";
const BINARY_CONTENT_TYPE: &str = "application/octet-stream";

/// Resultado de resolver un request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteOutcome {
    pub status: StatusCode,
    pub content_type: String,
    pub body: Vec<u8>,
    pub location: Option<String>,
}

impl RouteOutcome {
    /// Página generada con la plantilla estándar
    fn page(status: StatusCode, description: Option<&str>) -> Self {
        Self::titled_page(status, &status.to_string(), description)
    }

    fn titled_page(status: StatusCode, title: &str, description: Option<&str>) -> Self {
        Self {
            status,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            body: html::status_page(title, description).into_bytes(),
            location: None,
        }
    }

    pub fn reason_phrase(&self) -> &'static str {
        self.status.reason_phrase()
    }

    /// Convierte el resultado en una response lista para serializar
    pub fn to_message(&self) -> Message {
        let mut builder = ResponseBuilder::new(self.status).with_content(&self.content_type, self.body.clone());
        if let Some(location) = &self.location {
            builder = builder.with_location(location);
        }
        builder.build()
    }
}

/// Motivos por los que un request no llega a un 200
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("not found")]
    NotFound,

    #[error("forbidden")]
    Forbidden,

    #[error("invalid form syntax")]
    BadForm,

    #[error("method {0} not allowed")]
    MethodNotAllowed(String),
}

impl RouteError {
    pub fn status(&self) -> StatusCode {
        match self {
            RouteError::NotFound => StatusCode::NotFound,
            RouteError::Forbidden => StatusCode::Forbidden,
            RouteError::BadForm => StatusCode::BadRequest,
            RouteError::MethodNotAllowed(_) => StatusCode::MethodNotAllowed,
        }
    }
}

/// Route Resolver sobre un [`FileStore`]
pub struct Resolver<S> {
    store: S,
}

impl<S: FileStore> Resolver<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Resuelve un request; nunca falla
    ///
    /// # Ejemplo
    /// ```
    /// use raw_http::http::{Method, StatusCode};
    /// use raw_http::router::Resolver;
    /// use raw_http::store::MemoryStore;
    ///
    /// let resolver = Resolver::new(MemoryStore::new().with_file("index.html", "<p>hola</p>"));
    ///
    /// let outcome = resolver.resolve(&Method::GET, "/", b"");
    /// assert_eq!(outcome.status, StatusCode::Ok);
    /// assert_eq!(outcome.body, b"<p>hola</p>");
    /// ```
    pub fn resolve(&self, method: &Method, target: &str, body: &[u8]) -> RouteOutcome {
        let name = normalize_target(target);
        match self.try_resolve(method, name, body) {
            Ok(outcome) => outcome,
            Err(error) => self.error_outcome(&error),
        }
    }

    fn try_resolve(&self, method: &Method, name: &str, body: &[u8]) -> Result<RouteOutcome, RouteError> {
        match method {
            Method::GET | Method::HEAD => self.get(name),
            Method::POST => self.post(name, body),
            Method::Other(token) => Err(RouteError::MethodNotAllowed(token.clone())),
        }
    }

    fn get(&self, name: &str) -> Result<RouteOutcome, RouteError> {
        if let Some(&(_, canonical)) = REDIRECTS.iter().find(|(alias, _)| *alias == name) {
            let mut outcome = RouteOutcome::page(StatusCode::MovedPermanently, Some(canonical));
            outcome.location = Some(canonical.to_string());
            return Ok(outcome);
        }

        if !self.store.exists(name) {
            return Err(RouteError::NotFound);
        }
        if name == RESTRICTED_PAGE {
            return Err(RouteError::Forbidden);
        }
        if !SERVABLE_PAGES.contains(&name) {
            return Err(RouteError::NotFound);
        }

        let body = self.store.read(name).map_err(|e| {
            warn!(file = name, error = %e, "no se pudo leer el archivo");
            RouteError::NotFound
        })?;

        Ok(RouteOutcome {
            status: StatusCode::Ok,
            content_type: guess_mime(name).unwrap_or(BINARY_CONTENT_TYPE).to_string(),
            body,
            location: None,
        })
    }

    fn post(&self, name: &str, body: &[u8]) -> Result<RouteOutcome, RouteError> {
        if name != FORM_ENDPOINT || !self.store.exists(name) {
            return Err(RouteError::NotFound);
        }

        validate_registration(body)?;

        Ok(RouteOutcome::titled_page(
            StatusCode::Ok,
            "Registrasi Berhasil",
            Some("Silahkan verifikasi akun Anda melalui email yang Anda daftarkan"),
        ))
    }

    fn error_outcome(&self, error: &RouteError) -> RouteOutcome {
        match error {
            RouteError::NotFound => self.not_found(),
            RouteError::Forbidden => {
                RouteOutcome::page(StatusCode::Forbidden, Some("You cannot access private files"))
            }
            RouteError::BadForm => RouteOutcome::page(StatusCode::BadRequest, Some("Invalid syntax")),
            RouteError::MethodNotAllowed(method) => RouteOutcome::page(
                error.status(),
                Some(&format!("Method {} is not supported", method)),
            ),
        }
    }

    /// 404 estático si existe `404.html`, generado si no
    fn not_found(&self) -> RouteOutcome {
        let mut outcome = RouteOutcome::page(StatusCode::NotFound, None);
        if self.store.exists(NOT_FOUND_PAGE) {
            match self.store.read(NOT_FOUND_PAGE) {
                Ok(body) => outcome.body = body,
                Err(e) => warn!(error = %e, "no se pudo leer {}", NOT_FOUND_PAGE),
            }
        }
        outcome
    }
}

/// Quita una sola `/` inicial; el target vacío es la página índice
///
/// # Ejemplo
/// ```
/// use raw_http::router::normalize_target;
///
/// assert_eq!(normalize_target("/"), "index.html");
/// assert_eq!(normalize_target(""), "index.html");
/// assert_eq!(normalize_target("/private.html"), "private.html");
/// assert_eq!(normalize_target("//x"), "/x");
/// ```
pub fn normalize_target(target: &str) -> &str {
    let name = target.strip_prefix('/').unwrap_or(target);
    if name.is_empty() {
        INDEX_PAGE
    } else {
        name
    }
}

/// El formulario debe ser exactamente `email=...&password=...` (en cualquier orden)
fn validate_registration(body: &[u8]) -> Result<(), RouteError> {
    let text = std::str::from_utf8(body).map_err(|_| RouteError::BadForm)?;
    if text.is_empty() {
        return Err(RouteError::BadForm);
    }

    let pairs = text
        .split('&')
        .map(|pair| pair.split_once('=').ok_or(RouteError::BadForm))
        .collect::<Result<Vec<_>, _>>()?;

    let has = |key: &str| pairs.iter().any(|(k, _)| *k == key);
    if pairs.len() == 2 && has("email") && has("password") {
        Ok(())
    } else {
        Err(RouteError::BadForm)
    }
}
