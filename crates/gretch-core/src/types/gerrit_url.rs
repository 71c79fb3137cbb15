//! Gerrit server URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated Gerrit server base URL.
///
/// Must be an absolute `http` or `https` URL with a host. The stored form
/// is normalized without a trailing slash so endpoint paths can be
/// appended directly.
///
/// # Example
///
/// ```
/// use gretch_core::GerritUrl;
///
/// let base = GerritUrl::new("https://review.example.org/").unwrap();
/// assert_eq!(
///     base.endpoint_url(&["changes"], false),
///     "https://review.example.org/changes/"
/// );
/// assert_eq!(
///     base.endpoint_url(&["changes"], true),
///     "https://review.example.org/a/changes/"
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GerritUrl(Url);

impl GerritUrl {
    /// Create a new Gerrit URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not absolute, is not `http(s)`, or
    /// has no host.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::Url {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        Ok(Self(url))
    }

    /// Returns the endpoint URL for a REST path.
    ///
    /// `authed` selects the `/a/` namespace Gerrit uses for authenticated
    /// requests. The result carries the server's trailing slash
    /// convention.
    pub fn endpoint_url(&self, path: &[&str], authed: bool) -> String {
        // The url crate always renders a root path as "/".
        let mut url = self.0.as_str().trim_end_matches('/').to_string();
        if authed {
            url.push_str("/a");
        }
        for segment in path {
            url.push('/');
            url.push_str(segment);
        }
        url.push('/');
        url
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    /// Returns the URL scheme.
    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(InvalidInputError::Url {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }

        let scheme = url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(InvalidInputError::Url {
                value: original.to_string(),
                reason: "must use http or https".to_string(),
            }
            .into());
        }

        if url.host_str().is_none() {
            return Err(InvalidInputError::Url {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for GerritUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GerritUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for GerritUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for GerritUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        GerritUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for GerritUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}
