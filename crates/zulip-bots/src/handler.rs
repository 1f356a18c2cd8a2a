//! The long-poll loop that feeds mentions to a bot.
//!
//! ```text
//!  start()
//!    ├─ users/me ──────────► Mention("@**<full_name>**")
//!    └─ register ──────────► queue_id, last_event_id
//!
//!  run()
//!    loop {
//!      poll_once()
//!        ├─ events?dont_block=true
//!        ├─ for each event: decode, advance cursor, match mention
//!        └─ spawn dispatch ──► bot.handle_message ──► ReplyTarget::send
//!      sleep(poll_interval)            (dispatches keep running)
//!    }
//!    delete_queue
//! ```
//!
//! Per-event and per-dispatch errors are reported and never stop the loop.
//! Only `start()` failures are fatal.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, trace, warn};

use zulip_api::{EventQueue, Message, Messages, QueueEvent, RegisterOptions, Zulip};
use zulip_core::{ShapeError, ZulipError, ZulipResult};

use crate::bot::{Bot, BoxedBot};
use crate::error::HandlerError;
use crate::mention::Mention;
use crate::reply::ReplyTarget;

/// Delay between two polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Callback invoked with every reported error.
pub type ErrorHook = Arc<dyn Fn(&HandlerError) + Send + Sync>;

// =============================================================================
// Session
// =============================================================================

/// State of a started handler.
#[derive(Debug, Clone)]
pub struct Session {
    bot_full_name: String,
    mention: Mention,
    queue_id: String,
    last_event_id: i64,
}

impl Session {
    pub fn new(bot_full_name: impl Into<String>, queue: EventQueue) -> Self {
        let bot_full_name = bot_full_name.into();
        Self {
            mention: Mention::new(&bot_full_name),
            bot_full_name,
            queue_id: queue.queue_id,
            last_event_id: queue.last_event_id,
        }
    }

    /// The bot account's display name.
    pub fn bot_full_name(&self) -> &str {
        &self.bot_full_name
    }

    pub fn mention(&self) -> &Mention {
        &self.mention
    }

    pub fn queue_id(&self) -> &str {
        &self.queue_id
    }

    /// Highest event ID acknowledged so far.
    pub fn last_event_id(&self) -> i64 {
        self.last_event_id
    }
}

// =============================================================================
// Reporter
// =============================================================================

#[derive(Clone)]
struct Reporter {
    bot: Arc<str>,
    hook: Option<ErrorHook>,
}

impl Reporter {
    fn report(&self, err: HandlerError) {
        error!(bot = %self.bot, error = %err, "Bot handler error");
        if let Some(hook) = &self.hook {
            hook(&err);
        }
    }
}

// =============================================================================
// Handler
// =============================================================================

/// Runs one bot against one account.
pub struct BotHandler {
    bot: BoxedBot,
    zulip: Zulip,
    poll_interval: Duration,
    reporter: Reporter,
}

impl BotHandler {
    pub fn new(bot: BoxedBot, zulip: Zulip) -> Self {
        let name: Arc<str> = Arc::from(zulip.config().email());
        Self {
            bot,
            zulip,
            poll_interval: DEFAULT_POLL_INTERVAL,
            reporter: Reporter {
                bot: name,
                hook: None,
            },
        }
    }

    /// Sets the delay between polls.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the name used in log records. Defaults to the account email.
    pub fn name(mut self, name: impl AsRef<str>) -> Self {
        self.reporter.bot = Arc::from(name.as_ref());
        self
    }

    /// Installs a callback for reported errors.
    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&HandlerError) + Send + Sync + 'static,
    {
        self.reporter.hook = Some(Arc::new(hook));
        self
    }

    /// Resolves the bot's display name and registers a message queue.
    pub async fn start(&self) -> ZulipResult<Session> {
        let profile = self.zulip.users().get_current().await?;
        debug!(bot = %self.reporter.bot, full_name = %profile.full_name, "Resolved bot identity");

        let options = RegisterOptions::new()
            .event_types(["message"])
            .all_public_streams(true);
        let queue = self.zulip.events().register(&options).await?;

        info!(
            bot = %self.reporter.bot,
            queue_id = %queue.queue_id,
            last_event_id = queue.last_event_id,
            "Event queue registered"
        );
        Ok(Session::new(profile.full_name, queue))
    }

    /// Polls once and spawns a dispatch for every mention.
    ///
    /// The cursor advances past every well-formed message event, mention or
    /// not. The returned handles may be dropped; dispatches run detached.
    pub async fn poll_once(&self, session: &mut Session) -> ZulipResult<Vec<JoinHandle<()>>> {
        let events = self
            .zulip
            .events()
            .get(&session.queue_id, session.last_event_id, true)
            .await?;
        trace!(bot = %self.reporter.bot, count = events.len(), "Polled events");

        let mut dispatches = Vec::new();
        for raw in &events {
            let (id, message) = match QueueEvent::decode(raw) {
                Ok(QueueEvent::Message { id, message }) => (id, message),
                Ok(QueueEvent::Heartbeat) => continue,
                Ok(QueueEvent::Error { message }) => {
                    self.reporter.report(ZulipError::remote(message).into());
                    continue;
                }
                Err(err) => {
                    self.reporter.report(err.into());
                    continue;
                }
            };

            session.last_event_id = session.last_event_id.max(id);

            let stripped = message
                .content()
                .ok()
                .and_then(|content| session.mention.strip(content))
                .map(str::to_string);
            if let Some(content) = stripped {
                debug!(bot = %self.reporter.bot, event_id = id, "Dispatching mention");
                dispatches.push(self.dispatch(message, content));
            }
        }

        Ok(dispatches)
    }

    fn dispatch(&self, message: Message, content: String) -> JoinHandle<()> {
        let bot = Arc::clone(&self.bot);
        let messages = self.zulip.messages();
        let reporter = self.reporter.clone();
        let span = info_span!("dispatch", bot = %self.reporter.bot, message_id = message.id());

        tokio::spawn(
            async move {
                if let Err(err) = respond(bot.as_ref(), &messages, &message, &content).await {
                    reporter.report(err);
                }
            }
            .instrument(span),
        )
    }

    /// Runs until `shutdown` is cancelled, then deletes the queue.
    ///
    /// Fails only if [`start`](Self::start) fails.
    pub async fn run(&self, shutdown: CancellationToken) -> ZulipResult<()> {
        let started = tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),
            started = self.start() => started,
        };
        let mut session = match started {
            Ok(session) => session,
            Err(err) => {
                self.reporter.report(err.clone().into());
                return Err(err);
            }
        };

        loop {
            let polled = tokio::select! {
                _ = shutdown.cancelled() => break,
                polled = self.poll_once(&mut session) => polled,
            };
            match polled {
                Ok(dispatches) if !dispatches.is_empty() => {
                    debug!(bot = %self.reporter.bot, count = dispatches.len(), "Dispatched mentions");
                }
                Ok(_) => {}
                Err(err) => self.reporter.report(err.into()),
            }

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        info!(bot = %self.reporter.bot, queue_id = %session.queue_id, "Stopping, deleting event queue");
        if let Err(err) = self.zulip.events().delete_queue(&session.queue_id).await {
            warn!(bot = %self.reporter.bot, error = %err, "Failed to delete event queue");
        }
        Ok(())
    }
}

/// Asks the bot for a reply and posts it.
async fn respond(
    bot: &dyn Bot,
    messages: &Messages,
    message: &Message,
    content: &str,
) -> Result<(), HandlerError> {
    let reply = bot.handle_message(message, content).await?;
    if reply.is_empty() {
        return Err(ZulipError::from(ShapeError::InvalidMessageContent).into());
    }

    let target = ReplyTarget::from_message(message).map_err(ZulipError::from)?;
    let id = target.send(messages, &reply).await?;
    trace!(reply_id = id, to = %target.to(), "Reply sent");
    Ok(())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::{Value, json};
    use tokio::sync::Notify;
    use tokio_test::{assert_err, assert_ok};
    use zulip_core::testing::MockHttpClient;
    use zulip_core::{Config, Method};

    use super::*;
    use crate::bots::EchoBot;
    use crate::error::{BotError, BotResult};

    const BOT_NAME: &str = "Echo Bot";

    fn mock() -> (Zulip, Arc<MockHttpClient>) {
        mock_sending(json!({"result": "success", "msg": "", "id": 100}))
    }

    fn mock_sending(send_reply: Value) -> (Zulip, Arc<MockHttpClient>) {
        let config = Config::new("echo-bot@example.com", "api-key", "https://chat.example.com");
        let http = MockHttpClient::new(config.api_url());
        http.reply(
            Method::Get,
            "users/me",
            json!({"result": "success", "msg": "", "full_name": BOT_NAME}),
        );
        http.reply(
            Method::Post,
            "register",
            json!({"result": "success", "msg": "", "queue_id": "q1", "last_event_id": -1}),
        );
        http.reply(Method::Post, "messages", send_reply);
        http.reply(Method::Delete, "events", json!({"result": "success", "msg": ""}));
        (Zulip::new(config, http.clone()), http)
    }

    fn collect_errors(handler: BotHandler) -> (BotHandler, Arc<Mutex<Vec<String>>>) {
        let errors = Arc::new(Mutex::new(Vec::new()));
        let sink = errors.clone();
        let handler = handler.on_error(move |err| sink.lock().push(err.to_string()));
        (handler, errors)
    }

    fn stream_event(id: i64, content: &str) -> Value {
        json!({
            "id": id,
            "type": "message",
            "message": {
                "id": id * 10,
                "type": "stream",
                "content": content,
                "display_recipient": "general",
                "subject": "chat",
                "sender_email": "alice@example.com"
            }
        })
    }

    fn events(http: &MockHttpClient, events: Vec<Value>) {
        http.reply(Method::Get, "events", json!({"result": "success", "msg": "", "events": events}));
    }

    async fn join(dispatches: Vec<JoinHandle<()>>) {
        for handle in dispatches {
            handle.await.unwrap();
        }
    }

    /// Fails on "fail", waits for the gate on "wait", echoes otherwise.
    struct GateBot {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl Bot for GateBot {
        async fn handle_message(&self, _message: &Message, content: &str) -> BotResult<String> {
            match content {
                "fail" => Err(BotError::failed("refused")),
                "wait" => {
                    self.gate.notified().await;
                    Ok("done".into())
                }
                other => Ok(other.into()),
            }
        }
    }

    #[tokio::test]
    async fn test_start_resolves_identity_and_registers() {
        let (zulip, http) = mock();
        let handler = BotHandler::new(Arc::new(EchoBot), zulip);

        let session = assert_ok!(handler.start().await);
        assert_eq!(session.bot_full_name(), BOT_NAME);
        assert_eq!(session.mention().token(), "@**Echo Bot**");
        assert_eq!(session.queue_id(), "q1");
        assert_eq!(session.last_event_id(), -1);

        let params = &http.requests_to(Method::Post, "register")[0].params;
        assert_eq!(params["event_types"], r#"["message"]"#);
        assert_eq!(params["all_public_streams"], "true");
        assert_eq!(params["narrow"], "[]");
    }

    #[tokio::test]
    async fn test_start_fails_without_identity() {
        let config = Config::new("echo-bot@example.com", "api-key", "https://chat.example.com");
        let http = MockHttpClient::new(config.api_url());
        http.reply(Method::Get, "users/me", json!({"result": "error", "msg": "Invalid API key"}));
        let handler = BotHandler::new(Arc::new(EchoBot), Zulip::new(config, http.clone()));

        let err = assert_err!(handler.start().await);
        assert!(matches!(err, ZulipError::Remote { .. }));
        assert!(http.requests_to(Method::Post, "register").is_empty());
    }

    #[tokio::test]
    async fn test_cursor_advances_past_every_valid_event() {
        let (zulip, http) = mock();
        let (handler, errors) = collect_errors(BotHandler::new(Arc::new(EchoBot), zulip));
        let mut session = handler.start().await.unwrap();

        events(
            &http,
            vec![
                stream_event(4, "just chatting"),
                json!({"type": "heartbeat", "id": 50}),
                stream_event(7, "@**Echo Bot** hello"),
                stream_event(5, "hi @**Echo Bot**"),
                json!({"result": "error", "msg": "boom"}),
                json!({"message": {"content": "@**Echo Bot** no id"}}),
                json!({"id": 60, "message": {"type": "stream"}}),
            ],
        );

        let dispatches = assert_ok!(handler.poll_once(&mut session).await);
        assert_eq!(dispatches.len(), 1);
        assert_eq!(session.last_event_id(), 7);
        join(dispatches).await;

        assert_eq!(
            *errors.lock(),
            vec![
                "server error: boom".to_string(),
                "invalid event id".to_string(),
                "invalid message content".to_string(),
            ]
        );

        let sent = http.requests_to(Method::Post, "messages");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].params["content"], "hello");
        assert_eq!(sent[0].params["to"], "general");
        assert_eq!(sent[0].params["subject"], "chat");
        assert_eq!(sent[0].params["type"], "stream");
    }

    #[tokio::test]
    async fn test_next_poll_uses_cursor() {
        let (zulip, http) = mock();
        let handler = BotHandler::new(Arc::new(EchoBot), zulip);
        let mut session = handler.start().await.unwrap();

        events(&http, vec![stream_event(12, "unrelated")]);
        events(&http, vec![]);

        handler.poll_once(&mut session).await.unwrap();
        handler.poll_once(&mut session).await.unwrap();
        assert_eq!(session.last_event_id(), 12);

        let polls = http.requests_to(Method::Get, "events");
        assert_eq!(polls[0].params["last_event_id"], "-1");
        assert_eq!(polls[1].params["last_event_id"], "12");
        assert_eq!(polls[1].params["dont_block"], "true");
        assert!(http.requests_to(Method::Post, "messages").is_empty());
    }

    #[tokio::test]
    async fn test_cursor_never_moves_back() {
        let (zulip, http) = mock();
        let handler = BotHandler::new(Arc::new(EchoBot), zulip);
        let mut session = handler.start().await.unwrap();

        events(&http, vec![stream_event(9, "a"), stream_event(3, "b")]);
        handler.poll_once(&mut session).await.unwrap();
        assert_eq!(session.last_event_id(), 9);
    }

    #[tokio::test]
    async fn test_private_reply_routing() {
        let (zulip, http) = mock();
        let handler = BotHandler::new(Arc::new(EchoBot), zulip);
        let mut session = handler.start().await.unwrap();

        events(
            &http,
            vec![json!({
                "id": 1,
                "message": {
                    "type": "private",
                    "content": "@**Echo Bot**ping",
                    "display_recipient": [
                        {"email": "alice@example.com"},
                        {"email": "echo-bot@example.com"}
                    ]
                }
            })],
        );

        join(handler.poll_once(&mut session).await.unwrap()).await;

        let sent = &http.requests_to(Method::Post, "messages")[0].params;
        assert_eq!(sent["type"], "private");
        assert_eq!(sent["to"], "alice@example.com,echo-bot@example.com");
        assert_eq!(sent["content"], "ping");
        assert!(!sent.contains_key("subject"));
    }

    #[tokio::test]
    async fn test_private_message_without_recipients_is_not_sent() {
        let (zulip, http) = mock();
        let (handler, errors) = collect_errors(BotHandler::new(Arc::new(EchoBot), zulip));
        let mut session = handler.start().await.unwrap();

        events(
            &http,
            vec![json!({
                "id": 1,
                "message": {
                    "type": "private",
                    "content": "@**Echo Bot** ping",
                    "display_recipient": [{"full_name": "No Email"}]
                }
            })],
        );
        join(handler.poll_once(&mut session).await.unwrap()).await;

        assert!(http.requests_to(Method::Post, "messages").is_empty());
        assert_eq!(*errors.lock(), vec!["invalid message recipient".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_reply_is_reported() {
        let (zulip, http) = mock();
        let (handler, errors) = collect_errors(BotHandler::new(Arc::new(EchoBot), zulip));
        let mut session = handler.start().await.unwrap();

        events(&http, vec![stream_event(1, "@**Echo Bot**")]);
        join(handler.poll_once(&mut session).await.unwrap()).await;

        assert_eq!(*errors.lock(), vec!["invalid message content".to_string()]);
        assert!(http.requests_to(Method::Post, "messages").is_empty());
    }

    #[tokio::test]
    async fn test_reply_send_failure_is_reported() {
        let (zulip, http) = mock_sending(
            json!({"result": "error", "msg": "Not authorized to send to stream 'general'"}),
        );
        let (handler, errors) = collect_errors(BotHandler::new(Arc::new(EchoBot), zulip));
        let mut session = handler.start().await.unwrap();

        events(&http, vec![stream_event(1, "@**Echo Bot** hi")]);
        join(handler.poll_once(&mut session).await.unwrap()).await;

        let errors = errors.lock();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Not authorized"));
    }

    #[tokio::test]
    async fn test_dispatches_are_independent() {
        let (zulip, http) = mock();
        let gate = Arc::new(Notify::new());
        let bot = Arc::new(GateBot { gate: gate.clone() });
        let (handler, errors) = collect_errors(BotHandler::new(bot, zulip));
        let mut session = handler.start().await.unwrap();

        events(
            &http,
            vec![
                stream_event(1, "@**Echo Bot** wait"),
                stream_event(2, "@**Echo Bot** fail"),
            ],
        );
        events(&http, vec![]);
        let mut dispatches = handler.poll_once(&mut session).await.unwrap();
        assert_eq!(dispatches.len(), 2);

        let failing = dispatches.pop().unwrap();
        failing.await.unwrap();
        assert_eq!(*errors.lock(), vec!["bot failed: refused".to_string()]);

        // The next poll goes out with the advanced cursor while the first
        // dispatch is still waiting.
        let next = handler.poll_once(&mut session).await.unwrap();
        assert!(next.is_empty());
        let polls = http.requests_to(Method::Get, "events");
        assert_eq!(polls.len(), 2);
        assert_eq!(polls[1].params["last_event_id"], "2");
        assert!(!dispatches[0].is_finished());
        assert!(http.requests_to(Method::Post, "messages").is_empty());

        gate.notify_one();
        join(dispatches).await;
        let sent = http.requests_to(Method::Post, "messages");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].params["content"], "done");
        assert_eq!(errors.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_polls_on_interval_and_deletes_queue() {
        let (zulip, http) = mock();
        events(&http, vec![stream_event(10, "background noise")]);
        events(&http, vec![]);
        let handler = BotHandler::new(Arc::new(EchoBot), zulip);

        let shutdown = CancellationToken::new();
        let task = tokio::spawn({
            let shutdown = shutdown.clone();
            async move { handler.run(shutdown).await }
        });

        tokio::time::sleep(Duration::from_secs(5)).await;
        shutdown.cancel();
        assert_ok!(task.await.unwrap());

        let polls = http.requests_to(Method::Get, "events");
        assert_eq!(polls.len(), 3);
        assert_eq!(polls[1].params["last_event_id"], "10");
        assert_eq!(polls[2].params["last_event_id"], "10");

        let deletes = http.requests_to(Method::Delete, "events");
        assert_eq!(deletes.len(), 1);
        assert_eq!(deletes[0].params["queue_id"], "q1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_survives_poll_failures() {
        let (zulip, http) = mock();
        http.reply(
            Method::Get,
            "events",
            json!({"result": "error", "msg": "Bad event queue id: q1"}),
        );
        let (handler, errors) = collect_errors(
            BotHandler::new(Arc::new(EchoBot), zulip).poll_interval(Duration::from_secs(1)),
        );

        let shutdown = CancellationToken::new();
        let task = tokio::spawn({
            let shutdown = shutdown.clone();
            async move { handler.run(shutdown).await }
        });

        tokio::time::sleep(Duration::from_millis(2500)).await;
        shutdown.cancel();
        assert_ok!(task.await.unwrap());

        assert_eq!(http.requests_to(Method::Get, "events").len(), 3);
        assert_eq!(errors.lock().len(), 3);
    }

    #[tokio::test]
    async fn test_run_stops_on_start_failure() {
        let config = Config::new("echo-bot@example.com", "api-key", "https://chat.example.com");
        let http = MockHttpClient::new(config.api_url());
        http.reply(Method::Get, "users/me", json!({"result": "success", "msg": ""}));
        let (handler, errors) =
            collect_errors(BotHandler::new(Arc::new(EchoBot), Zulip::new(config, http.clone())));

        let err = assert_err!(handler.run(CancellationToken::new()).await);
        assert_eq!(err.as_shape(), Some(&ShapeError::InvalidMention));
        assert_eq!(errors.lock().len(), 1);
        assert!(http.requests_to(Method::Get, "events").is_empty());
    }
}
