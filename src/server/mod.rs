//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Dos threads y una cola entre ellos:
//! 1. El acceptor ([`tcp`]) acepta una conexión, lee un request completo y lo encola
//! 2. El worker ([`worker`]) saca requests de la cola y escribe las respuestas
//!
//! Las respuestas salen en el mismo orden en que se aceptaron los requests.

pub mod queue;
pub mod shutdown;
pub mod tcp;
pub mod worker;

// Re-exportar para facilitar el uso
pub use queue::{ConnectionHandle, DispatchQueue, PendingRequest};
pub use shutdown::{install_signal_handler, ShutdownHandle};
pub use tcp::Server;
pub use worker::ResponseWorker;
