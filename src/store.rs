//! # Almacén de Archivos
//! src/store.rs
//!
//! Acceso a los archivos estáticos que sirve el servidor. El Route Resolver
//! solo conoce el trait [`FileStore`]; el servidor usa [`DirStore`] (relativo a
//! un directorio raíz) y los tests usan [`MemoryStore`].

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Fuente de archivos servibles
pub trait FileStore: Send + 'static {
    /// Verifica si existe un archivo regular con ese nombre
    fn exists(&self, name: &str) -> bool;

    /// Lee el archivo completo
    fn read(&self, name: &str) -> io::Result<Vec<u8>>;
}

/// Content type a partir de la extensión del archivo
///
/// # Ejemplo
/// ```
/// use raw_http::store::guess_mime;
///
/// assert_eq!(guess_mime("index.html"), Some("text/html"));
/// assert_eq!(guess_mime("logo.PNG"), Some("image/png"));
/// assert_eq!(guess_mime("sin_extension"), None);
/// ```
pub fn guess_mime(name: &str) -> Option<&'static str> {
    let extension = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    let mime = match extension.as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" | "mjs" => "text/javascript",
        "json" => "application/json",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "xml" => "application/xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/vnd.microsoft.icon",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        _ => return None,
    };
    Some(mime)
}

/// Archivos bajo un directorio raíz
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Ruta dentro de la raíz; `None` si el nombre intenta salir de ella
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        let inside = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
        inside.then(|| self.root.join(relative))
    }
}

impl FileStore for DirStore {
    fn exists(&self, name: &str) -> bool {
        self.resolve(name).is_some_and(|path| path.is_file())
    }

    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        let path = self.resolve(name).ok_or_else(|| {
            io::Error::new(io::ErrorKind::PermissionDenied, format!("path escapes root: {}", name))
        })?;
        fs::read(path)
    }
}

/// Archivos en memoria
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, name: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(name, contents);
        self
    }

    pub fn insert(&mut self, name: &str, contents: impl Into<Vec<u8>>) {
        self.files.insert(name.to_string(), contents.into());
    }
}

impl FileStore for MemoryStore {
    fn exists(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, name.to_string()))
    }
}
