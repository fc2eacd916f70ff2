//! Inicialización del logging (tracing).
//!
//! `RUST_LOG` tiene prioridad; si no está definido se usa el filtro que pasa
//! cada binario. Los logs van a stderr para no mezclarse con la salida del
//! cliente.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // try_init: en tests puede haber un subscriber global ya instalado
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}
