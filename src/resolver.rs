//! Capability traits implemented by the provider adapters.
//!
//! Every adapter offers the same operation in a blocking and an async flavor.
//! Both share the adapter's rate-limit gate and error classification; only the
//! transport call differs.
//!
//! # Example
//!
//! ```rust,no_run
//! use cool_ip_api::{FullResolver, RequestOptions, Target};
//!
//! async fn country_of<R: FullResolver>(resolver: &R, ip: &str) -> cool_ip_api::Result<R::Response> {
//!     let target = Target::parse(ip)?;
//!     resolver.resolve_async(&target, &RequestOptions::new()).await
//! }
//! ```

use std::future::Future;

use crate::error::IpApiError;
use crate::transport::RequestOptions;
use crate::types::{IpVersion, Target};

/// Resolver that geolocates an arbitrary target.
///
/// Implemented by ip-api.com, ipapi.co, ipapi.com, abstractapi.com, ipinfo.io
/// and ipwho.is.
pub trait FullResolver: Send + Sync {
    /// The provider's response schema.
    type Response: Send;

    /// Look up `target`, blocking the current thread.
    ///
    /// Must not be called from within an async runtime.
    fn resolve(
        &self,
        target: &Target,
        options: &RequestOptions,
    ) -> Result<Self::Response, IpApiError>;

    /// Look up `target` without blocking.
    fn resolve_async(
        &self,
        target: &Target,
        options: &RequestOptions,
    ) -> impl Future<Output = Result<Self::Response, IpApiError>> + Send;
}

/// Resolver that only reports the caller's own public address.
///
/// Implemented by ipify.org and myip.wtf.
pub trait SelfIpResolver: Send + Sync {
    /// The provider's response schema.
    type Response: Send;

    /// Report the caller's address for `version`, blocking the current thread.
    ///
    /// Must not be called from within an async runtime.
    fn resolve(
        &self,
        version: IpVersion,
        options: &RequestOptions,
    ) -> Result<Self::Response, IpApiError>;

    /// Report the caller's address for `version` without blocking.
    fn resolve_async(
        &self,
        version: IpVersion,
        options: &RequestOptions,
    ) -> impl Future<Output = Result<Self::Response, IpApiError>> + Send;
}

/// Convenience methods for full resolvers taking user input.
///
/// Automatically implemented for every [`FullResolver`].
pub trait FullResolverExt: FullResolver {
    /// Parse `input` into a [`Target`] and look it up, blocking.
    ///
    /// Malformed input fails with [`IpApiError::InvalidInput`] before the
    /// rate-limit gate or the network is touched.
    fn lookup(&self, input: &str) -> Result<Self::Response, IpApiError> {
        let target = Target::parse(input)?;
        self.resolve(&target, &RequestOptions::default())
    }

    /// Parse `input` into a [`Target`] and look it up without blocking.
    fn lookup_async(
        &self,
        input: &str,
    ) -> impl Future<Output = Result<Self::Response, IpApiError>> + Send {
        let parsed = Target::parse(input);
        async move {
            let target = parsed?;
            let options = RequestOptions::default();
            self.resolve_async(&target, &options).await
        }
    }
}

impl<T: FullResolver> FullResolverExt for T {}
