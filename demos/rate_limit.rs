//! Example: Watch the rate-limit gate at work.
//!
//! A deliberately tight policy makes the local denial visible after two
//! lookups. Keyed providers pick up their key from the environment (or a
//! `.env` file) when present.
//!
//! Run with: cargo run --example rate_limit

use std::time::Duration;

use cool_ip_api::providers::{IpInfoIo, IpWhoIs};
use cool_ip_api::rate_limit::RateLimitPolicy;
use cool_ip_api::{ApiKey, FullResolverExt};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let resolver = IpWhoIs::builder()
        .rate_limit(RateLimitPolicy::new(2, Duration::from_secs(30)))
        .build();

    for attempt in 1..=3 {
        match resolver.lookup_async("8.8.8.8").await {
            Ok(response) => println!("#{attempt}: {} ({})", response.city, response.country),
            Err(e) if e.is_local_rate_limit() => println!("#{attempt}: denied locally: {e}"),
            Err(e) => println!("#{attempt}: {} error: {e}", e.kind()),
        }
        if let Some(snapshot) = resolver.gate().snapshot() {
            println!(
                "    remaining {}/{} (in flight {}), window {:?}",
                snapshot.remaining, snapshot.limit_amount, snapshot.in_flight, snapshot.window
            );
        }
    }

    if let Some(token) = ApiKey::from_env("IPINFO_TOKEN") {
        println!("\n=== ipinfo.io ===");
        let ipinfo = IpInfoIo::new(token);
        println!("{:?}", ipinfo);
        match ipinfo.lookup_async("1.1.1.1").await {
            Ok(response) => println!("{} {:?}", response.ip, response.org),
            Err(e) => println!("{} error: {e}", e.kind()),
        }
        println!("remaining this month: {:?}", ipinfo.gate().remaining());
    }

    Ok(())
}
