//! Realm members and the current account.

use serde_json::Value;

use zulip_core::{Params, ShapeError, ZulipResult, bool_param};

use crate::client::ApiClient;
use crate::model::{Profile, User};

/// Client for the `users` resource.
#[derive(Debug, Clone)]
pub struct Users {
    api: ApiClient,
}

impl Users {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Lists the realm's members.
    pub async fn get_all(&self, client_gravatar: bool) -> ZulipResult<Vec<User>> {
        let mut params = Params::new();
        params.insert("client_gravatar".into(), bool_param(client_gravatar));

        let response = self.api.get("users", params).await?;
        response.decode("members", "a list of users")
    }

    /// Fetches the authenticated account.
    ///
    /// Fails with [`ShapeError::InvalidMention`] when the profile has no
    /// `full_name`, since mentions of this account cannot be recognized
    /// without it.
    pub async fn get_current(&self) -> ZulipResult<Profile> {
        let response = self.api.get("users/me", Params::new()).await?;
        response.str_field("full_name", ShapeError::InvalidMention)?;

        let payload = response.into_payload()?;
        serde_json::from_value(Value::Object(payload)).map_err(|_| {
            ShapeError::InvalidField {
                field: "users/me",
                expected: "a user profile",
            }
            .into()
        })
    }

    /// Creates an account. Requires administrator rights.
    pub async fn create(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        short_name: &str,
    ) -> ZulipResult<()> {
        let mut params = Params::new();
        params.insert("email".into(), email.into());
        params.insert("password".into(), password.into());
        params.insert("full_name".into(), full_name.into());
        params.insert("short_name".into(), short_name.into());

        self.api.post("users", params).await?.check().map(drop)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};
    use zulip_core::{Method, ZulipError};

    use super::*;
    use crate::test_support::mock_zulip;

    #[tokio::test]
    async fn test_get_all() {
        let (zulip, http) = mock_zulip();
        http.reply(
            Method::Get,
            "users",
            json!({
                "result": "success",
                "msg": "",
                "members": [
                    {"user_id": 1, "email": "alice@example.com", "full_name": "Alice"},
                    {"user_id": 2, "email": "echo-bot@example.com", "full_name": "Echo", "is_bot": true}
                ]
            }),
        );

        let users = assert_ok!(zulip.users().get_all(false).await);
        assert_eq!(users.len(), 2);
        assert!(users[1].is_bot);
        assert_eq!(
            http.requests_to(Method::Get, "users")[0].params["client_gravatar"],
            "false"
        );
    }

    #[tokio::test]
    async fn test_get_current_strips_bookkeeping() {
        let (zulip, http) = mock_zulip();
        http.reply(
            Method::Get,
            "users/me",
            json!({
                "result": "success",
                "msg": "",
                "full_name": "Echo Bot",
                "email": "echo-bot@example.com",
                "user_id": 9,
                "is_bot": true,
                "timezone": "UTC"
            }),
        );

        let profile = assert_ok!(zulip.users().get_current().await);
        assert_eq!(profile.full_name, "Echo Bot");
        assert_eq!(profile.user_id, 9);
        assert!(profile.extra.contains_key("timezone"));
        assert!(!profile.extra.contains_key("msg"));
        assert!(!profile.extra.contains_key("result"));
    }

    #[tokio::test]
    async fn test_get_current_without_name() {
        let (zulip, http) = mock_zulip();
        http.reply(Method::Get, "users/me", json!({"result": "success", "msg": ""}));

        let err = assert_err!(zulip.users().get_current().await);
        assert_eq!(err.as_shape(), Some(&ShapeError::InvalidMention));
    }

    #[tokio::test]
    async fn test_get_current_reports_auth_failure() {
        let (zulip, http) = mock_zulip();
        http.reply(
            Method::Get,
            "users/me",
            json!({"result": "error", "msg": "Invalid API key", "code": "UNAUTHORIZED"}),
        );

        let err = assert_err!(zulip.users().get_current().await);
        assert!(matches!(err, ZulipError::Remote { message } if message == "Invalid API key"));
    }

    #[tokio::test]
    async fn test_create() {
        let (zulip, http) = mock_zulip();
        http.reply(Method::Post, "users", json!({"result": "success", "msg": ""}));

        assert_ok!(
            zulip
                .users()
                .create("new@example.com", "hunter2", "New User", "new")
                .await
        );
        let params = &http.requests_to(Method::Post, "users")[0].params;
        assert_eq!(params["full_name"], "New User");
        assert_eq!(params["short_name"], "new");
    }
}
