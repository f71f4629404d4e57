//! Example: Look up an address from the command line.
//!
//! Resolves through ip-api.com in blocking mode and prints the result as JSON.
//! Without an argument the caller's own address is looked up.
//!
//! Run with: cargo run --example cli -- 8.8.8.8
//! Set `RUST_LOG=cool_ip_api=debug` to see the request path.

use cool_ip_api::providers::IpApiCom;
use cool_ip_api::FullResolverExt;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let input = std::env::args().nth(1).unwrap_or_default();

    let resolver = IpApiCom::new();
    match resolver.lookup(&input) {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(e) => {
            eprintln!("Lookup failed ({}): {}", e.kind(), e);
            std::process::exit(1);
        }
    }
}
