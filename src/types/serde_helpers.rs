//! Custom serde helpers for provider response quirks.
//!
//! Providers encode a few values in non-standard ways. These modules keep the
//! quirks out of the response structs.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serializer};

/// Serialize/deserialize a `Vec<String>` as a comma-separated string.
///
/// Order is preserved, so a value serializes back to exactly what was received.
///
/// # Example
///
/// ```rust
/// use serde::{Serialize, Deserialize};
/// use cool_ip_api::types::serde_helpers::comma_separated;
///
/// #[derive(Serialize, Deserialize, Debug, PartialEq)]
/// struct Country {
///     #[serde(with = "comma_separated")]
///     borders: Vec<String>,
/// }
///
/// let country: Country = serde_json::from_str(r#"{"borders":"CA,MX"}"#).unwrap();
/// assert_eq!(country.borders, vec!["CA", "MX"]);
/// assert_eq!(serde_json::to_string(&country).unwrap(), r#"{"borders":"CA,MX"}"#);
/// ```
pub mod comma_separated {
    use super::*;

    /// Serialize a list as a comma-separated string.
    pub fn serialize<S>(items: &[String], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&items.join(","))
    }

    /// Deserialize a comma-separated string into a list.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        if s.is_empty() {
            return Ok(Vec::new());
        }
        Ok(s.split(',').map(|part| part.trim().to_string()).collect())
    }
}

/// Deserialize a boolean sent either as a JSON bool or as `"true"`/`"false"`.
///
/// # Example
///
/// ```rust
/// use serde::Deserialize;
/// use cool_ip_api::types::serde_helpers::lenient_bool;
///
/// #[derive(Deserialize)]
/// struct Exit {
///     #[serde(deserialize_with = "lenient_bool::deserialize")]
///     tor: bool,
/// }
///
/// assert!(serde_json::from_str::<Exit>(r#"{"tor":"true"}"#).unwrap().tor);
/// assert!(!serde_json::from_str::<Exit>(r#"{"tor":false}"#).unwrap().tor);
/// ```
pub mod lenient_bool {
    use super::*;

    /// Deserialize a bool or a bool-like string.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct LenientBoolVisitor;

        impl<'de> de::Visitor<'de> for LenientBoolVisitor {
            type Value = bool;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a boolean or a boolean string")
            }

            fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(v)
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                match v.trim().to_ascii_lowercase().as_str() {
                    "true" | "1" | "yes" => Ok(true),
                    "false" | "0" | "no" | "" => Ok(false),
                    other => Err(de::Error::custom(format!("invalid boolean '{}'", other))),
                }
            }
        }

        deserializer.deserialize_any(LenientBoolVisitor)
    }
}

/// Deserialize to `None` instead of failing on unexpected data.
///
/// Useful for informational fields that some providers fill inconsistently.
///
/// # Example
///
/// ```rust
/// use serde::Deserialize;
/// use cool_ip_api::types::serde_helpers::default_on_error;
///
/// #[derive(Deserialize, Debug)]
/// struct Country {
///     #[serde(deserialize_with = "default_on_error::deserialize", default)]
///     population: Option<u64>,
/// }
///
/// let country: Country = serde_json::from_str(r#"{"population":"unknown"}"#).unwrap();
/// assert!(country.population.is_none());
/// ```
pub mod default_on_error {
    use super::*;

    /// Deserialize a value, returning None if deserialization fails.
    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(T::deserialize(value).ok())
    }
}
