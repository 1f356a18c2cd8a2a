//! Listing streams and managing subscriptions.

use zulip_core::{Params, PayloadField, ShapeError, ZulipResult, bool_param};

use crate::client::ApiClient;
use crate::model::{
    GetStreamsOptions, Stream, StreamSpec, SubscribeOptions, SubscribeResult, Subscription,
    UnsubscribeResult, encode,
};

const SUBSCRIPTIONS: &str = "users/me/subscriptions";

/// Client for the `streams` and `subscriptions` resources.
#[derive(Debug, Clone)]
pub struct Streams {
    api: ApiClient,
}

impl Streams {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Lists the streams visible to the current user.
    pub async fn get_all(&self, options: GetStreamsOptions) -> ZulipResult<Vec<Stream>> {
        let mut params = Params::new();
        params.insert("include_public".into(), bool_param(options.include_public));
        params.insert(
            "include_subscribed".into(),
            bool_param(options.include_subscribed),
        );
        params.insert("include_default".into(), bool_param(options.include_default));
        params.insert(
            "include_all_active".into(),
            bool_param(options.include_all_active),
        );

        let response = self.api.get("streams", params).await?;
        response.decode("streams", "a list of streams")
    }

    /// Looks up a stream's ID by name.
    pub async fn get_id(&self, name: &str) -> ZulipResult<i64> {
        let mut params = Params::new();
        params.insert("stream".into(), name.into());

        let response = self.api.get("get_stream_id", params).await?;
        response.i64_field("stream_id", ShapeError::MissingField("stream_id"))
    }

    /// Lists the current user's subscriptions.
    pub async fn get_subscribed(&self) -> ZulipResult<Vec<Subscription>> {
        let response = self.api.get(SUBSCRIPTIONS, Params::new()).await?;
        response.decode("subscriptions", "a list of subscriptions")
    }

    /// Subscribes users to streams, creating missing streams.
    pub async fn subscribe(
        &self,
        streams: &[StreamSpec],
        options: &SubscribeOptions,
    ) -> ZulipResult<SubscribeResult> {
        let mut params = Params::new();
        params.insert("subscriptions".into(), encode(streams, PayloadField::Streams)?);
        params.insert(
            "principals".into(),
            encode(&options.principals, PayloadField::Principals)?,
        );
        params.insert("invite_only".into(), bool_param(options.invite_only));
        params.insert("announce".into(), bool_param(options.announce));
        params.insert(
            "authorization_errors_fatal".into(),
            bool_param(options.authorization_errors_fatal),
        );

        let response = self.api.post(SUBSCRIPTIONS, params).await?.check()?;
        let map_of_lists = "a map of user to stream names";

        Ok(SubscribeResult {
            subscribed: response.decode("subscribed", map_of_lists)?,
            already_subscribed: response.decode("already_subscribed", map_of_lists)?,
            unauthorized: response
                .decode_optional("unauthorized", "a list of stream names")?
                .unwrap_or_default(),
        })
    }

    /// Unsubscribes users from streams by name.
    ///
    /// An empty `principals` list means the current user.
    pub async fn unsubscribe(
        &self,
        stream_names: &[String],
        principals: &[String],
    ) -> ZulipResult<UnsubscribeResult> {
        let mut params = Params::new();
        params.insert(
            "subscriptions".into(),
            encode(stream_names, PayloadField::StreamNames)?,
        );
        params.insert(
            "principals".into(),
            encode(principals, PayloadField::Principals)?,
        );

        let response = self.api.delete(SUBSCRIPTIONS, params).await?.check()?;
        let names = "a list of stream names";

        Ok(UnsubscribeResult {
            removed: response.decode("removed", names)?,
            not_subscribed: response
                .decode_optional("not_subscribed", names)?
                .unwrap_or_default(),
        })
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
    async fn test_get_all_sends_filters() {
        let (zulip, http) = mock_zulip();
        http.reply(
            Method::Get,
            "streams",
            json!({
                "result": "success",
                "msg": "",
                "streams": [
                    {"stream_id": 1, "name": "general", "description": "Everyone", "invite_only": false, "is_web_public": true},
                    {"stream_id": 2, "name": "secret", "invite_only": true}
                ]
            }),
        );

        let streams = assert_ok!(zulip.streams().get_all(GetStreamsOptions::default()).await);
        assert_eq!(streams.len(), 2);
        assert_eq!(streams[0].name, "general");
        assert_eq!(streams[0].extra["is_web_public"], json!(true));
        assert!(streams[1].invite_only);

        let params = &http.requests_to(Method::Get, "streams")[0].params;
        assert_eq!(params["include_public"], "true");
        assert_eq!(params["include_subscribed"], "true");
        assert_eq!(params["include_default"], "false");
        assert_eq!(params["include_all_active"], "false");
    }

    #[tokio::test]
    async fn test_get_all_active_requires_admin() {
        let (zulip, http) = mock_zulip();
        http.reply(
            Method::Get,
            "streams",
            json!({"result": "error", "msg": "User not authorized for this query"}),
        );

        let options = GetStreamsOptions {
            include_all_active: true,
            ..Default::default()
        };
        let err = assert_err!(zulip.streams().get_all(options).await);
        assert!(matches!(err, ZulipError::Remote { .. }));
    }

    #[tokio::test]
    async fn test_get_id() {
        let (zulip, http) = mock_zulip();
        http.reply(
            Method::Get,
            "get_stream_id",
            json!({"result": "success", "msg": "", "stream_id": 15}),
        );

        assert_eq!(assert_ok!(zulip.streams().get_id("general").await), 15);
        let params = &http.requests_to(Method::Get, "get_stream_id")[0].params;
        assert_eq!(params["stream"], "general");
    }

    #[tokio::test]
    async fn test_get_subscribed() {
        let (zulip, http) = mock_zulip();
        http.reply(
            Method::Get,
            SUBSCRIPTIONS,
            json!({
                "result": "success",
                "subscriptions": [{"stream_id": 1, "name": "general", "color": "#76ce90"}]
            }),
        );

        let subs = assert_ok!(zulip.streams().get_subscribed().await);
        assert_eq!(subs[0].color.as_deref(), Some("#76ce90"));
    }

    #[tokio::test]
    async fn test_subscribe() {
        let (zulip, http) = mock_zulip();
        http.reply(
            Method::Post,
            SUBSCRIPTIONS,
            json!({
                "result": "success",
                "msg": "",
                "subscribed": {"bot@example.com": ["new-stream"]},
                "already_subscribed": {"bot@example.com": ["general"]}
            }),
        );

        let streams = [
            StreamSpec::new("new-stream").with_description("Fresh"),
            StreamSpec::new("general"),
        ];
        let result = assert_ok!(
            zulip
                .streams()
                .subscribe(&streams, &SubscribeOptions::default())
                .await
        );
        assert_eq!(result.subscribed["bot@example.com"], vec!["new-stream"]);
        assert_eq!(result.already_subscribed["bot@example.com"], vec!["general"]);
        assert!(result.unauthorized.is_empty());

        let params = &http.requests_to(Method::Post, SUBSCRIPTIONS)[0].params;
        assert_eq!(
            params["subscriptions"],
            r#"[{"name":"new-stream","description":"Fresh"},{"name":"general"}]"#
        );
        assert_eq!(params["principals"], "[]");
        assert_eq!(params["authorization_errors_fatal"], "true");
    }

    #[tokio::test]
    async fn test_subscribe_mistyped_response() {
        let (zulip, http) = mock_zulip();
        http.reply(
            Method::Post,
            SUBSCRIPTIONS,
            json!({"result": "success", "subscribed": ["general"], "already_subscribed": {}}),
        );

        let err = assert_err!(
            zulip
                .streams()
                .subscribe(&[StreamSpec::new("general")], &SubscribeOptions::default())
                .await
        );
        assert!(matches!(
            err.as_shape(),
            Some(ShapeError::InvalidField { field: "subscribed", .. })
        ));
    }

    #[tokio::test]
    async fn test_unsubscribe() {
        let (zulip, http) = mock_zulip();
        http.reply(
            Method::Delete,
            SUBSCRIPTIONS,
            json!({"result": "success", "msg": "", "removed": ["general"], "not_subscribed": ["other"]}),
        );

        let names = vec!["general".to_string(), "other".to_string()];
        let result = assert_ok!(zulip.streams().unsubscribe(&names, &[]).await);
        assert_eq!(result.removed, vec!["general"]);
        assert_eq!(result.not_subscribed, vec!["other"]);

        let params = &http.requests_to(Method::Delete, SUBSCRIPTIONS)[0].params;
        assert_eq!(params["subscriptions"], r#"["general","other"]"#);
    }
}
