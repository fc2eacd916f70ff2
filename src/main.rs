//! # Servidor HTTP - Entry Point
//! src/main.rs
//!
//! Lee `httpserver.conf` (o el archivo de `--config`), sirve los archivos de
//! `--root` y corre hasta recibir SIGINT/SIGTERM.

use clap::Parser;
use raw_http::config::{ServerArgs, ServerConfig};
use raw_http::logging::init_logging;
use raw_http::server::{install_signal_handler, Server};
use raw_http::store::DirStore;
use tracing::{error, info};

fn main() {
    init_logging("raw_http=info");
    let args = ServerArgs::parse();

    let config = match ServerConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "configuración inválida");
            std::process::exit(1);
        }
    };
    info!(address = %config.address(), root = %args.root.display(), "configuración cargada");

    if let Err(e) = serve(&config, DirStore::new(&args.root)) {
        error!(error = %e, "error fatal");
        std::process::exit(1);
    }
}

fn serve(config: &ServerConfig, store: DirStore) -> std::io::Result<()> {
    let server = Server::bind(config, store)?;
    install_signal_handler(server.shutdown_handle())?;
    server.run()
}
