use std::net::{Ipv4Addr, Ipv6Addr};

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cool_ip_api::providers::{Ipify, MyIpWtf, SelfIpEndpoints};
use cool_ip_api::{ErrorKind, IpApiError, IpVersion, RequestOptions, SelfIpResolver};

fn endpoints(server: &MockServer) -> SelfIpEndpoints {
    let base = server.uri();
    SelfIpEndpoints::new(
        format!("{base}/v4"),
        format!("{base}/v6"),
        format!("{base}/any"),
    )
}

async fn mount_ipify(server: &MockServer, route: &str, ip: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ip": ip })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_ipify_single_family() {
    let server = MockServer::start().await;
    mount_ipify(&server, "/v6", "2001:db8::7").await;

    let resolver = Ipify::builder().endpoints(endpoints(&server)).build();
    let me = resolver
        .resolve_async(IpVersion::Ipv6, &RequestOptions::new())
        .await
        .unwrap();

    assert_eq!(me.ipv4, None);
    assert_eq!(me.ipv6, Some("2001:db8::7".parse::<Ipv6Addr>().unwrap()));
}

#[tokio::test]
async fn test_ipify_dualstack_reports_either_family() {
    let server = MockServer::start().await;
    mount_ipify(&server, "/any", "198.51.100.23").await;

    let resolver = Ipify::builder().endpoints(endpoints(&server)).build();
    let me = resolver
        .resolve_async(IpVersion::DualStack, &RequestOptions::new())
        .await
        .unwrap();

    assert_eq!(me.ipv4, Some(Ipv4Addr::new(198, 51, 100, 23)));
    assert_eq!(me.ipv6, None);
}

#[tokio::test]
async fn test_ipify_combined_merges_both_families() {
    let server = MockServer::start().await;
    mount_ipify(&server, "/v4", "198.51.100.23").await;
    mount_ipify(&server, "/v6", "2001:db8::7").await;

    let resolver = Ipify::builder().endpoints(endpoints(&server)).build();
    let me = resolver
        .resolve_async(IpVersion::Combined, &RequestOptions::new())
        .await
        .unwrap();

    assert_eq!(me.ipv4, Some(Ipv4Addr::new(198, 51, 100, 23)));
    assert_eq!(me.ipv6, Some("2001:db8::7".parse::<Ipv6Addr>().unwrap()));
}

#[tokio::test]
async fn test_ipify_combined_partial_failure() {
    let server = MockServer::start().await;
    mount_ipify(&server, "/v4", "198.51.100.23").await;
    Mock::given(method("GET"))
        .and(path("/v6"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = Ipify::builder().endpoints(endpoints(&server)).build();
    let me = resolver
        .resolve_async(IpVersion::Combined, &RequestOptions::new())
        .await
        .unwrap();

    assert_eq!(me.ipv4, Some(Ipv4Addr::new(198, 51, 100, 23)));
    assert_eq!(me.ipv6, None);
}

#[tokio::test]
async fn test_myip_wtf_combined_both_fail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = MyIpWtf::builder().endpoints(endpoints(&server)).build();
    let err = resolver
        .resolve_async(IpVersion::Combined, &RequestOptions::new())
        .await
        .unwrap_err();

    // The IPv4 half closed the window, so the IPv6 half never left.
    match err {
        IpApiError::CombinedFailed { ipv4, ipv6 } => {
            assert_eq!(ipv4.kind(), ErrorKind::RateLimit);
            assert!(!ipv4.is_local_rate_limit());
            assert!(ipv6.is_local_rate_limit());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_myip_wtf_combined() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "YourFuckingIPAddress": "203.0.113.7",
            "YourFuckingLocation": "Berlin, BE, Germany",
            "YourFuckingHostname": "v4.example.net",
            "YourFuckingISP": "Example Telecom",
            "YourFuckingTorExit": "false",
            "YourFuckingCountryCode": "DE"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v6"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "YourFuckingIPAddress": "2001:db8::1",
            "YourFuckingLocation": "Berlin, BE, Germany",
            "YourFuckingHostname": "v6.example.net",
            "YourFuckingISP": "Example Telecom",
            "YourFuckingTorExit": false,
            "YourFuckingCountryCode": "DE"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = MyIpWtf::builder().endpoints(endpoints(&server)).build();
    let me = resolver
        .resolve_async(IpVersion::Combined, &RequestOptions::new())
        .await
        .unwrap();

    assert_eq!(me.ipv4, Some(Ipv4Addr::new(203, 0, 113, 7)));
    assert_eq!(me.ipv6, Some("2001:db8::1".parse::<Ipv6Addr>().unwrap()));
    assert_eq!(me.v4_hostname.as_deref(), Some("v4.example.net"));
    assert_eq!(me.v6_hostname.as_deref(), Some("v6.example.net"));
    assert!(!me.tor_exit);
    assert_eq!(resolver.gate().remaining(), Some(0));
}
