//! Connection configuration for a single Zulip account.

use std::fmt;

use crate::http::Credentials;

/// Path segment appended to the realm URL to reach the REST API.
pub const API_PATH: &str = "/api/v1";

/// Account credentials and the API base URL of a realm.
///
/// Immutable after construction; share it behind an `Arc`.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    email: String,
    api_key: String,
    realm_url: String,
    api_url: String,
}

impl Config {
    /// Creates a configuration.
    ///
    /// `realm_url` is the realm's root, e.g. `https://chat.zulip.org`.
    pub fn new(
        email: impl Into<String>,
        api_key: impl Into<String>,
        realm_url: impl Into<String>,
    ) -> Self {
        let realm_url = realm_url.into().trim_end_matches('/').to_string();
        let api_url = format!("{realm_url}{API_PATH}");
        Self {
            email: email.into(),
            api_key: api_key.into(),
            realm_url,
            api_url,
        }
    }

    /// The account's email address.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// The account's API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The realm root URL, without a trailing slash.
    pub fn realm_url(&self) -> &str {
        &self.realm_url
    }

    /// The REST API base URL.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Basic-auth credentials derived from the email and API key.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.email, &self.api_key)
    }

    /// Builds the full URL of an API endpoint.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("email", &self.email)
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .finish()
    }
}
