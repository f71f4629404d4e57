use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cool_ip_api::providers::{
    AbstractApi, IpApiCom, IpInfoIo, IpWhoIs, IpapiCo, IpapiCom, Language, QueryStatus,
};
use cool_ip_api::{ErrorKind, FullResolver, FullResolverExt, IpApiError, RequestOptions, Target};

fn ip_api_com_success() -> serde_json::Value {
    serde_json::json!({
        "status": "success",
        "continent": "North America",
        "continentCode": "NA",
        "country": "United States",
        "countryCode": "US",
        "region": "VA",
        "regionName": "Virginia",
        "city": "Ashburn",
        "district": "",
        "zip": "20149",
        "lat": 39.03,
        "lon": -77.5,
        "timezone": "America/New_York",
        "offset": -14400,
        "currency": "USD",
        "isp": "Google LLC",
        "org": "Google Public DNS",
        "as": "AS15169 Google LLC",
        "asname": "GOOGLE",
        "reverse": "dns.google",
        "mobile": false,
        "proxy": false,
        "hosting": true,
        "query": "8.8.8.8"
    })
}

#[tokio::test]
async fn test_ip_api_com_lookup() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/8.8.8.8"))
        .and(query_param("fields", "66846719"))
        .and(query_param("lang", "fr"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ip_api_com_success()))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = IpApiCom::builder()
        .base_url(server.uri())
        .language(Language::Fr)
        .build();
    let response = resolver.lookup_async("8.8.8.8").await.unwrap();

    assert_eq!(response.status, QueryStatus::Success);
    assert_eq!(response.city, "Ashburn");
    assert_eq!(response.district, None);
    assert_eq!(response.reverse.as_deref(), Some("dns.google"));
    assert_eq!(resolver.gate().remaining(), Some(44));
}

#[tokio::test]
async fn test_ip_api_com_resolves_host_names() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/dns.google"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ip_api_com_success()))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = IpApiCom::builder().base_url(server.uri()).build();
    let response = resolver.lookup_async(" DNS.Google ").await.unwrap();
    assert_eq!(response.query, "8.8.8.8");
}

#[tokio::test]
async fn test_ip_api_com_limit_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Rl", "0")
                .insert_header("X-Ttl", "42")
                .set_body_json(ip_api_com_success()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let resolver = IpApiCom::builder().base_url(server.uri()).build();
    resolver.lookup_async("8.8.8.8").await.unwrap();
    assert_eq!(resolver.gate().remaining(), Some(0));

    // The provider said the window is spent; the second call never leaves.
    let err = resolver.lookup_async("8.8.8.8").await.unwrap_err();
    assert!(err.is_local_rate_limit());
}

#[tokio::test]
async fn test_ipapi_co_lookup() {
    let server = MockServer::start().await;
    let response = serde_json::json!({
        "ip": "8.8.8.8",
        "network": "8.8.8.0/24",
        "version": "IPv4",
        "city": "Mountain View",
        "region": "California",
        "region_code": "CA",
        "country": "US",
        "country_name": "United States",
        "country_code": "US",
        "country_code_iso3": "USA",
        "country_capital": "Washington",
        "country_tld": ".us",
        "continent_code": "NA",
        "in_eu": false,
        "postal": null,
        "latitude": 37.42301,
        "longitude": -122.083352,
        "timezone": "America/Los_Angeles",
        "utc_offset": "-0700",
        "country_calling_code": "+1",
        "currency": "USD",
        "currency_name": "Dollar",
        "languages": "en-US,es-US",
        "country_area": "n/a",
        "country_population": 327167434,
        "asn": "AS15169",
        "org": "GOOGLE"
    });

    Mock::given(method("GET"))
        .and(path("/8.8.8.8/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = IpapiCo::builder().base_url(server.uri()).build();
    let response = resolver
        .resolve_async(&Target::parse("8.8.8.8").unwrap(), &RequestOptions::new())
        .await
        .unwrap();

    assert_eq!(response.languages, vec!["en-US", "es-US"]);
    assert_eq!(response.country_area, None);
    assert_eq!(response.postal, None);
    assert_eq!(resolver.gate().remaining(), Some(999));
}

#[tokio::test]
async fn test_ipapi_co_forbidden_is_authentication() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = IpapiCo::builder().base_url(server.uri()).build();
    let err = resolver.lookup_async("").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert_eq!(resolver.gate().remaining(), Some(1000));
}

#[tokio::test]
async fn test_ipapi_com_error_codes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/check"))
        .and(query_param("access_key", "bad-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": false,
            "error": {
                "code": 101,
                "type": "invalid_access_key",
                "info": "You have not supplied a valid API Access Key."
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = IpapiCom::builder("bad-key").base_url(server.uri()).build();
    let err = resolver
        .resolve_async(&Target::Own, &RequestOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(err, IpApiError::Authentication(ref m) if m.contains("valid API Access Key")));
    assert_eq!(resolver.gate().remaining(), Some(1000));
}

#[tokio::test]
async fn test_ipapi_com_monthly_quota() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1.1.1.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": false,
            "error": {
                "code": 104,
                "type": "usage_limit_reached",
                "info": "Your monthly API request volume has been reached."
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = IpapiCom::builder("key").base_url(server.uri()).build();
    let err = resolver.lookup_async("1.1.1.1").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Quota);

    let err = resolver.lookup_async("1.1.1.1").await.unwrap_err();
    assert!(err.is_local_rate_limit());
}

#[tokio::test]
async fn test_abstractapi_lookup() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("api_key", "secret-key"))
        .and(query_param("ip_address", "2001:4860:4860::8888"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ip_address": "2001:4860:4860::8888",
            "city": null,
            "country": "United States",
            "country_code": "US",
            "latitude": 37.751,
            "longitude": -97.822,
            "security": { "is_vpn": false },
            "timezone": { "name": "America/Chicago", "gmt_offset": -5, "is_dst": true },
            "connection": { "autonomous_system_number": 15169 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = AbstractApi::builder("secret-key")
        .base_url(server.uri())
        .build();
    let response = resolver
        .lookup_async("2001:4860:4860::8888")
        .await
        .unwrap();

    assert_eq!(response.country_code.as_deref(), Some("US"));
    assert_eq!(response.city, None);
}

#[tokio::test]
async fn test_abstractapi_quota_exhausted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
            "error": {
                "message": "Quota reached",
                "code": "quota_reached",
                "details": null
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = AbstractApi::builder("key").base_url(server.uri()).build();
    let err = resolver.lookup_async("8.8.8.8").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Quota);

    let err = resolver.lookup_async("8.8.8.8").await.unwrap_err();
    assert!(err.is_local_rate_limit());
}

#[tokio::test]
async fn test_ipinfo_io_lookup() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .and(query_param("token", "token-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ip": "203.0.113.9",
            "city": "Sydney",
            "region": "New South Wales",
            "country": "AU",
            "loc": "-33.8678,151.2073",
            "timezone": "Australia/Sydney"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = IpInfoIo::builder("token-123")
        .base_url(server.uri())
        .build();
    let response = resolver
        .resolve_async(&Target::Own, &RequestOptions::new())
        .await
        .unwrap();

    let coords = response.coordinates().unwrap().unwrap();
    assert_eq!(coords.longitude, 151.2073);
    assert_eq!(response.hostname, None);
}

#[tokio::test]
async fn test_ipinfo_io_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/8.8.8.8"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "status": 429,
            "error": { "title": "Rate limit exceeded", "message": "Upgrade to increase your usage limits" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = IpInfoIo::builder("token").base_url(server.uri()).build();
    let err = resolver.lookup_async("8.8.8.8").await.unwrap_err();

    match err {
        IpApiError::RateLimit {
            message, origin, ..
        } => {
            assert_eq!(origin, cool_ip_api::RateLimitOrigin::Remote);
            assert!(message.contains("Upgrade"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(resolver.gate().remaining(), Some(0));
}

#[tokio::test]
async fn test_ipwho_is_invalid_address() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/10.0.0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ip": "10.0.0.1",
            "success": false,
            "message": "Reserved range"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = IpWhoIs::builder().base_url(server.uri()).build();
    let err = resolver.lookup_async("10.0.0.1").await.unwrap_err();

    assert!(matches!(err, IpApiError::InvalidInput(ref m) if m == "Reserved range"));
    assert_eq!(resolver.gate().remaining(), Some(9_999));
}

#[tokio::test]
async fn test_unclassified_failure_keeps_raw_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = IpWhoIs::builder().base_url(server.uri()).build();
    let err = resolver.lookup_async("8.8.8.8").await.unwrap_err();

    match err {
        IpApiError::Api(api) => {
            assert_eq!(api.status, 502);
            assert!(api.body.contains("Bad Gateway"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(resolver.gate().remaining(), Some(10_000));
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ip": 42 })))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = IpWhoIs::builder().base_url(server.uri()).build();
    let err = resolver.lookup_async("8.8.8.8").await.unwrap_err();

    assert!(matches!(err, IpApiError::InvalidResponse(_)));
    assert_eq!(err.kind(), ErrorKind::Generic);
}
