//! Example: Discover the caller's public addresses.
//!
//! Run with: cargo run --example self_ip

use cool_ip_api::providers::{Ipify, MyIpWtf};
use cool_ip_api::{IpVersion, RequestOptions, SelfIpResolver};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let options = RequestOptions::new();

    println!("=== ipify.org ===");
    let ipify = Ipify::new();
    for version in [IpVersion::Ipv4, IpVersion::Ipv6, IpVersion::DualStack] {
        match ipify.resolve_async(version, &options).await {
            Ok(me) => println!("{:<10} v4={:?} v6={:?}", version, me.ipv4, me.ipv6),
            Err(e) => println!("{:<10} failed: {}", version, e),
        }
    }

    // One request per family; a missing IPv6 route only empties that slot.
    println!("\n=== myip.wtf (combined) ===");
    let wtf = MyIpWtf::new();
    let me = wtf.resolve_async(IpVersion::Combined, &options).await?;
    println!("IPv4: {:?} ({:?})", me.ipv4, me.v4_hostname);
    println!("IPv6: {:?} ({:?})", me.ipv6, me.v6_hostname);
    println!("ISP: {}, {}", me.isp, me.location);
    println!("Tor exit: {}", me.tor_exit);

    Ok(())
}
