//! # Códigos de Estado HTTP
//! src/http/status.rs
//!
//! Códigos de estado que el servidor puede producir. El cliente no usa este
//! enum: guarda el código numérico tal como llega en la status line, porque un
//! servidor ajeno puede responder con cualquier código.

/// Códigos de estado que produce el Route Resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK - Página servida o formulario aceptado
    Ok = 200,

    /// 301 Moved Permanently - Alias legado de una página canónica
    MovedPermanently = 301,

    /// 400 Bad Request - Formulario mal formado
    BadRequest = 400,

    /// 403 Forbidden - Página restringida
    Forbidden = 403,

    /// 404 Not Found - Ruta o archivo inexistente
    NotFound = 404,

    /// 405 Method Not Allowed - Método distinto de GET, HEAD o POST
    MethodNotAllowed = 405,
}

impl StatusCode {
    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use raw_http::http::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Retorna el texto de razón (reason phrase) asociado al código
    ///
    /// # Ejemplo
    /// ```
    /// use raw_http::http::StatusCode;
    /// assert_eq!(StatusCode::Forbidden.reason_phrase(), "Forbidden");
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::MovedPermanently => "Moved Permanently",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
        }
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}
