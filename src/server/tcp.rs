//! # Servidor TCP
//! src/server/tcp.rs
//!
//! Loop principal (acceptor) en el thread main:
//!
//! 1. `accept` bloqueante
//! 2. Espera acotada ([`READY_TIMEOUT`]) a que la conexión sea legible
//! 3. Lee un request completo con el framer
//! 4. Lo encola para el worker de respuestas
//!
//! Se atiende una conexión por iteración. Después de encolar, el acceptor no
//! vuelve a tocar la conexión: pasa a ser del worker. Los errores de una
//! conexión se quedan en esa conexión.
//!
//! Además del timeout por lectura, el request completo tiene un plazo total
//! ([`FRAME_DEADLINE`]): un cliente que manda el body de a pocos bytes no puede
//! retener al acceptor más que eso.

use super::queue::{ConnectionHandle, DispatchQueue, PendingRequest};
use super::shutdown::ShutdownHandle;
use super::worker::ResponseWorker;
use crate::config::ServerConfig;
use crate::http::{framer, StartLine};
use crate::router::Resolver;
use crate::store::FileStore;
use std::io::{self, Read};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Espera máxima por datos en una conexión recién aceptada (y por cada lectura)
pub const READY_TIMEOUT: Duration = Duration::from_secs(2);

/// Plazo total para recibir un request, contado desde el `accept`
pub const FRAME_DEADLINE: Duration = Duration::from_secs(10);

/// Servidor HTTP: acceptor + worker de respuestas
pub struct Server<S> {
    listener: TcpListener,
    store: S,
    shutdown: ShutdownHandle,
}

impl<S: FileStore> Server<S> {
    /// Hace bind a la dirección configurada
    pub fn bind(config: &ServerConfig, store: S) -> io::Result<Self> {
        let listener = TcpListener::bind((config.host.as_str(), config.port))?;
        let address = listener.local_addr()?;
        info!(address = %address, "servidor escuchando");

        Ok(Self {
            listener,
            store,
            shutdown: ShutdownHandle::new(Arc::new(AtomicBool::new(false)), address),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Corre hasta que se dispare el [`ShutdownHandle`]
    ///
    /// Al salir detiene el worker (después de la respuesta en curso) y cierra
    /// las conexiones que quedaron en la cola.
    pub fn run(self) -> io::Result<()> {
        let Server {
            listener,
            store,
            shutdown,
        } = self;

        let queue = DispatchQueue::new();
        let worker = ResponseWorker::spawn(queue.clone(), Resolver::new(store))?;

        for incoming in listener.incoming() {
            if shutdown.is_triggered() {
                break;
            }
            match incoming {
                Ok(stream) => accept_one(stream, &queue),
                Err(e) => warn!(error = %e, "error al aceptar conexión"),
            }
        }

        worker.stop();
        let abandoned = queue.drain().len();
        info!(abandoned, "servidor detenido");
        Ok(())
    }
}

/// Lee un request de la conexión y lo encola; si falla, la conexión se cierra
fn accept_one(stream: TcpStream, queue: &DispatchQueue) {
    accept_within(stream, queue, FRAME_DEADLINE);
}

fn accept_within(stream: TcpStream, queue: &DispatchQueue, deadline: Duration) {
    let until = Instant::now() + deadline;
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    match wait_readable(&stream) {
        Ok(true) => {}
        Ok(false) => {
            debug!(peer = %peer, "conexión sin datos, se descarta");
            return;
        }
        Err(e) => {
            warn!(peer = %peer, error = %e, "error esperando datos");
            return;
        }
    }

    let mut reader = Deadline {
        stream: &stream,
        until,
    };
    let message = match framer::read_request(&mut reader) {
        Ok(message) => message,
        Err(e) => {
            warn!(peer = %peer, error = %e, "request inválido, se descarta la conexión");
            return;
        }
    };

    let StartLine::Request {
        method,
        target,
        version,
    } = message.start_line
    else {
        return;
    };

    info!(peer = %peer, method = %method, target = %target, version = %version, "RECV");
    debug!(peer = %peer, body = %String::from_utf8_lossy(&message.body), "body recibido");

    queue.enqueue(PendingRequest {
        connection: ConnectionHandle::new(stream, peer),
        method,
        target,
        version,
        body: message.body,
    });
}

/// Lectura acotada por el tiempo que le queda al request
struct Deadline<'a> {
    stream: &'a TcpStream,
    until: Instant,
}

impl Read for Deadline<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.until.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "request deadline exceeded"));
        }
        self.stream.set_read_timeout(Some(remaining.min(READY_TIMEOUT)))?;

        let mut stream = self.stream;
        stream.read(buf)
    }
}

/// `false` si el peer cerró o no envió nada dentro del timeout
fn wait_readable(stream: &TcpStream) -> io::Result<bool> {
    stream.set_read_timeout(Some(READY_TIMEOUT))?;

    let mut probe = [0u8; 1];
    match stream.peek(&mut probe) {
        Ok(0) => Ok(false),
        Ok(_) => Ok(true),
        Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => Ok(false),
        Err(e) => Err(e),
    }
}
