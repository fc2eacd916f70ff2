//! # Worker de Respuestas
//! src/server/worker.rs
//!
//! Un único thread que vacía la cola de despacho y responde cada request en
//! orden de llegada. Solo se produce una respuesta a la vez.
//!
//! ```text
//! DispatchQueue → Resolver → RouteOutcome → Message → socket
//! ```
//!
//! El flag `running` se revisa una vez por iteración: al detener el worker se
//! termina la respuesta en curso y luego el loop sale.

use super::queue::{DispatchQueue, PendingRequest};
use crate::http::{Method, StatusCode};
use crate::router::Resolver;
use crate::store::FileStore;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Espera máxima de cada `dequeue` antes de volver a revisar el flag
pub const DEQUEUE_TIMEOUT: Duration = Duration::from_secs(1);

/// Handle del thread worker
pub struct ResponseWorker {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ResponseWorker {
    /// Inicia el thread; la cola y el resolver se pasan explícitamente
    pub fn spawn<S: FileStore>(queue: DispatchQueue, resolver: Resolver<S>) -> io::Result<Self> {
        let running = Arc::new(AtomicBool::new(true));

        let handle = thread::Builder::new().name("response-worker".to_string()).spawn({
            let running = Arc::clone(&running);
            move || worker_loop(queue, resolver, running)
        })?;

        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    #[cfg(test)]
    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Pide al worker que termine y espera a que salga del loop
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("el worker de respuestas terminó con panic");
            }
        }
    }
}

impl Drop for ResponseWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop<S: FileStore>(queue: DispatchQueue, resolver: Resolver<S>, running: Arc<AtomicBool>) {
    info!("worker de respuestas iniciado");

    while running.load(Ordering::Acquire) {
        if let Some(request) = queue.dequeue_timeout(DEQUEUE_TIMEOUT) {
            respond(&resolver, request);
        }
    }

    info!(pending = queue.len(), "worker de respuestas detenido");
}

/// Produce y envía la respuesta de un request
///
/// Un error de escritura solo se registra: el worker sigue con el próximo.
pub fn respond<S: FileStore>(resolver: &Resolver<S>, request: PendingRequest) -> StatusCode {
    let PendingRequest {
        mut connection,
        method,
        target,
        body,
        ..
    } = request;

    let outcome = resolver.resolve(&method, &target, &body);
    let message = outcome.to_message();
    let bytes = if method == Method::HEAD {
        message.head_bytes()
    } else {
        message.to_bytes()
    };

    match connection.send(&bytes) {
        Ok(()) => {
            info!(
                peer = connection.peer(),
                method = %method,
                target = %target,
                status = %outcome.status,
                "SEND"
            );
            debug!(bytes = bytes.len(), "respuesta escrita");
        }
        Err(e) => {
            warn!(
                peer = connection.peer(),
                method = %method,
                target = %target,
                error = %e,
                "no se pudo enviar la respuesta"
            );
        }
    }

    outcome.status
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::queue::ConnectionHandle;
    use crate::store::MemoryStore;
    use std::io::Write;
    use std::sync::Mutex;
    use std::time::Instant;

    /// Conexión falsa que registra cada escritura en un log compartido
    struct Recorder {
        name: String,
        log: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
    }

    impl Write for Recorder {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.log.lock().unwrap().push((self.name.clone(), buf.to_vec()));
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer gone"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn request(connection: ConnectionHandle, method: Method, target: &str) -> PendingRequest {
        PendingRequest {
            connection,
            method,
            target: target.to_string(),
            version: "HTTP/1.1".to_string(),
            body: Vec::new(),
        }
    }

    fn store() -> MemoryStore {
        MemoryStore::new().with_file("index.html", "<p>home</p>")
    }

    fn wait_until(mut condition: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !condition() {
            assert!(Instant::now() < deadline, "timed out");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_responses_follow_arrival_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let queue = DispatchQueue::new();

        for name in ["A", "B", "C"] {
            let recorder = Recorder {
                name: name.to_string(),
                log: Arc::clone(&log),
            };
            queue.enqueue(request(ConnectionHandle::new(recorder, name), Method::GET, "/"));
        }

        let worker = ResponseWorker::spawn(queue.clone(), Resolver::new(store())).unwrap();
        wait_until(|| queue.is_empty() && log.lock().unwrap().len() >= 3);
        worker.stop();

        let writers: Vec<String> = log.lock().unwrap().iter().map(|(name, _)| name.clone()).collect();
        let mut deduped = writers.clone();
        deduped.dedup();
        // Cada respuesta se escribe completa antes de empezar la siguiente
        assert_eq!(deduped, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_head_sends_only_headers() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let recorder = Recorder {
            name: "h".to_string(),
            log: Arc::clone(&log),
        };

        let status = respond(
            &Resolver::new(store()),
            request(ConnectionHandle::new(recorder, "h"), Method::HEAD, "/"),
        );
        assert_eq!(status, StatusCode::Ok);

        let written: Vec<u8> = log.lock().unwrap().iter().flat_map(|(_, b)| b.clone()).collect();
        let text = String::from_utf8(written).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Length: 11\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
        assert!(!text.contains("<p>home</p>"));
    }

    #[test]
    fn test_write_failure_does_not_stop_worker() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let queue = DispatchQueue::new();
        queue.enqueue(request(ConnectionHandle::new(Broken, "broken"), Method::GET, "/"));
        queue.enqueue(request(
            ConnectionHandle::new(
                Recorder {
                    name: "ok".to_string(),
                    log: Arc::clone(&log),
                },
                "ok",
            ),
            Method::GET,
            "/missing.html",
        ));

        let worker = ResponseWorker::spawn(queue.clone(), Resolver::new(store())).unwrap();
        wait_until(|| !log.lock().unwrap().is_empty());
        assert!(worker.is_running());
        worker.stop();

        let written: Vec<u8> = log.lock().unwrap().iter().flat_map(|(_, b)| b.clone()).collect();
        assert!(String::from_utf8(written).unwrap().starts_with("HTTP/1.1 404 Not Found"));
    }

    #[test]
    fn test_stop_returns_promptly_when_idle() {
        let worker = ResponseWorker::spawn(DispatchQueue::new(), Resolver::new(store())).unwrap();
        let start = Instant::now();
        worker.stop();
        assert!(start.elapsed() < DEQUEUE_TIMEOUT * 3);
    }
}
