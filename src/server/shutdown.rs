//! Apagado del servidor.
//!
//! El acceptor queda bloqueado en `accept`; para sacarlo de ahí se levanta el
//! flag y se abre una conexión local que despierta al `accept`.

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const WAKE_TIMEOUT: Duration = Duration::from_secs(1);

/// Handle clonable para detener un servidor en ejecución
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    wake_addr: SocketAddr,
}

impl ShutdownHandle {
    pub(crate) fn new(flag: Arc<AtomicBool>, mut listen_addr: SocketAddr) -> Self {
        if listen_addr.ip().is_unspecified() {
            let loopback: IpAddr = match listen_addr {
                SocketAddr::V4(_) => Ipv4Addr::LOCALHOST.into(),
                SocketAddr::V6(_) => Ipv6Addr::LOCALHOST.into(),
            };
            listen_addr.set_ip(loopback);
        }
        Self {
            flag,
            wake_addr: listen_addr,
        }
    }

    /// Levanta el flag y despierta al acceptor
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
        if let Err(e) = TcpStream::connect_timeout(&self.wake_addr, WAKE_TIMEOUT) {
            debug!(error = %e, "no se pudo despertar al acceptor");
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Detiene el servidor al recibir SIGINT o SIGTERM
#[cfg(unix)]
pub fn install_signal_handler(handle: ShutdownHandle) -> io::Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    std::thread::Builder::new()
        .name("signal-listener".to_string())
        .spawn(move || {
            if let Some(signal) = signals.forever().next() {
                tracing::info!(signal, "señal recibida, deteniendo el servidor");
                handle.trigger();
            }
        })?;
    Ok(())
}

#[cfg(not(unix))]
pub fn install_signal_handler(_handle: ShutdownHandle) -> io::Result<()> {
    Ok(())
}
