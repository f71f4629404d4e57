//! # cool-ip-api
//!
//! A uniform Rust client for IP geolocation and "what is my IP" web services.
//!
//! ## Features
//!
//! - Eight providers behind two traits: [`FullResolver`] and [`SelfIpResolver`]
//! - Blocking and async calls sharing one rate-limit gate per provider
//! - Local denial before any network activity once a quota is exhausted
//! - Provider errors classified into one closed set of [`ErrorKind`]s
//! - Strong typing for every provider's response schema
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cool_ip_api::providers::IpApiCom;
//! use cool_ip_api::FullResolverExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let resolver = IpApiCom::new();
//!     let location = resolver.lookup_async("8.8.8.8").await?;
//!     println!("{}, {}", location.city, location.country);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod error;
pub mod providers;
pub mod rate_limit;
pub mod resolver;
pub mod transport;
pub mod types;

// Re-export commonly used types at crate root
pub use auth::ApiKey;
pub use error::{ApiError, ErrorKind, IpApiError, RateLimitOrigin};
pub use resolver::{FullResolver, FullResolverExt, SelfIpResolver};
pub use transport::RequestOptions;
pub use types::common::{IpVersion, Target};

/// Result type alias using IpApiError
pub type Result<T> = std::result::Result<T, IpApiError>;
