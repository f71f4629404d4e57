//! Credentials for keyed providers.

mod credentials;

pub use credentials::ApiKey;
