//! # Cola de Despacho
//! src/server/queue.rs
//!
//! Cola FIFO thread-safe entre el acceptor (productor) y el worker de
//! respuestas (consumidor). `enqueue` nunca bloquea; `dequeue_timeout` espera
//! con un Condvar hasta que llegue algo o venza el timeout.
//!
//! El orden de llegada es la única garantía: nada se reordena ni se prioriza.

use crate::http::Method;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Conexión abierta hacia el cliente
///
/// Se cierra al hacer drop, después de escribir la respuesta.
pub struct ConnectionHandle {
    stream: Box<dyn Write + Send>,
    peer: String,
}

impl ConnectionHandle {
    pub fn new(stream: impl Write + Send + 'static, peer: impl Into<String>) -> Self {
        Self {
            stream: Box::new(stream),
            peer: peer.into(),
        }
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Escribe todos los bytes y hace flush
    pub fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stream.write_all(bytes)?;
        self.stream.flush()
    }
}

impl std::fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandle").field("peer", &self.peer).finish()
    }
}

/// Request ya parseado, esperando respuesta
#[derive(Debug)]
pub struct PendingRequest {
    pub connection: ConnectionHandle,
    pub method: Method,
    pub target: String,
    pub version: String,
    pub body: Vec<u8>,
}

/// Cola FIFO compartida
pub struct DispatchQueue {
    items: Arc<Mutex<VecDeque<PendingRequest>>>,

    /// Notifica al worker cuando hay un request nuevo
    condvar: Arc<Condvar>,
}

impl DispatchQueue {
    pub fn new() -> Self {
        Self {
            items: Arc::new(Mutex::new(VecDeque::new())),
            condvar: Arc::new(Condvar::new()),
        }
    }

    // Un panic con el lock tomado no deja la cola inconsistente
    fn lock(&self) -> MutexGuard<'_, VecDeque<PendingRequest>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Encola al final; solo limitado por memoria
    pub fn enqueue(&self, request: PendingRequest) {
        self.lock().push_back(request);
        self.condvar.notify_one();
    }

    /// Desencola el más antiguo, esperando a lo sumo `timeout`
    ///
    /// Retorna `None` si la cola siguió vacía durante todo el timeout.
    pub fn dequeue_timeout(&self, timeout: Duration) -> Option<PendingRequest> {
        let items = self.lock();
        let (mut items, _) = self
            .condvar
            .wait_timeout_while(items, timeout, |items| items.is_empty())
            .unwrap_or_else(PoisonError::into_inner);
        items.pop_front()
    }

    /// Intenta desencolar sin bloquear
    #[cfg(test)]
    pub(crate) fn try_dequeue(&self) -> Option<PendingRequest> {
        self.lock().pop_front()
    }

    /// Saca todo lo pendiente (usado al apagar el servidor)
    pub fn drain(&self) -> Vec<PendingRequest> {
        self.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DispatchQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for DispatchQueue {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            condvar: Arc::clone(&self.condvar),
        }
    }
}
