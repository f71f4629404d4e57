use cool_ip_api::providers::{IpApiCom, IpInfoIo, Ipify, MyIpWtf};
use cool_ip_api::{ApiKey, FullResolverExt, IpVersion, RequestOptions, SelfIpResolver};

fn live_tests_enabled() -> bool {
    std::env::var("COOL_IP_LIVE_TESTS").ok().as_deref() == Some("1")
}

#[tokio::test]
#[ignore]
async fn live_ip_api_com_smoke() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv::dotenv();
    if !live_tests_enabled() {
        return Ok(());
    }

    let resolver = IpApiCom::new();
    let response = resolver.lookup_async("8.8.8.8").await?;
    assert_eq!(response.country_code, "US");

    Ok(())
}

#[tokio::test]
#[ignore]
async fn live_ipinfo_io_smoke() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv::dotenv();
    if !live_tests_enabled() {
        return Ok(());
    }

    let token = match ApiKey::from_env("IPINFO_TOKEN") {
        Some(token) => token,
        None => return Ok(()),
    };
    let resolver = IpInfoIo::new(token);
    let response = resolver.lookup_async("1.1.1.1").await?;
    assert_eq!(response.ip, "1.1.1.1");

    Ok(())
}

#[tokio::test]
#[ignore]
async fn live_self_ip_smoke() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv::dotenv();
    if !live_tests_enabled() {
        return Ok(());
    }

    let ipify = Ipify::new()
        .resolve_async(IpVersion::DualStack, &RequestOptions::new())
        .await?;
    assert!(ipify.ipv4.is_some() || ipify.ipv6.is_some());

    let wtf = MyIpWtf::new()
        .resolve_async(IpVersion::DualStack, &RequestOptions::new())
        .await?;
    assert!(!wtf.isp.is_empty());

    Ok(())
}
