//! Provider base URLs.

/// ip-api.com (plain HTTP only on the free tier).
pub const IP_API_COM_BASE_URL: &str = "http://ip-api.com/";

/// ipapi.co.
pub const IPAPI_CO_BASE_URL: &str = "https://ipapi.co/";

/// ipapi.com (plain HTTP only on the free tier).
pub const IPAPI_COM_BASE_URL: &str = "http://api.ipapi.com/api/";

/// abstractapi.com IP geolocation.
pub const ABSTRACTAPI_BASE_URL: &str = "https://ipgeolocation.abstractapi.com/v1/";

/// ipinfo.io.
pub const IPINFO_IO_BASE_URL: &str = "https://ipinfo.io/";

/// ipwho.is.
pub const IPWHO_IS_BASE_URL: &str = "https://ipwho.is/";

/// ipify.org endpoints per address family.
pub mod ipify {
    /// IPv4 only.
    pub const IPV4: &str = "https://api4.ipify.org/";
    /// IPv6 only.
    pub const IPV6: &str = "https://api6.ipify.org/";
    /// Either family.
    pub const DUALSTACK: &str = "https://api64.ipify.org/";
}

/// myip.wtf (wtfismyip.com) endpoints per address family.
pub mod myip_wtf {
    /// IPv4 only.
    pub const IPV4: &str = "https://ipv4.wtfismyip.com/json";
    /// IPv6 only.
    pub const IPV6: &str = "https://ipv6.wtfismyip.com/json";
    /// Either family.
    pub const DUALSTACK: &str = "https://wtfismyip.com/json";
}

/// ip-api.com field mask selecting every documented field.
pub const IP_API_COM_ALL_FIELDS: u32 = 66_846_719;
