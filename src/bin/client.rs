//! # Cliente HTTP - Entry Point
//! src/bin/client.rs
//!
//! Un request (más sus redirecciones); la salida va a stdout.

use clap::Parser;
use raw_http::client::Client;
use raw_http::config::ClientArgs;
use raw_http::http::Method;
use raw_http::logging::init_logging;

fn main() {
    init_logging("raw_http=warn");
    let args = ClientArgs::parse();

    let method = Method::from(args.method.to_uppercase().as_str());
    let client = Client::new(&args.host, args.port)
        .with_version(&args.protocol)
        .with_max_redirects(args.max_redirects);

    let stdout = std::io::stdout();
    if let Err(e) = client.send(&method, &args.urn, &args.body, &mut stdout.lock()) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
