//! WebSocket endpoint
//!
//! GET /ws?token=<JWT>
//! The token is optional: customers connect without one and may only use
//! token-addressed table commands. Browsers cannot set headers on a
//! WebSocket, so staff pass their JWT as a query parameter.
//!
//! Each subscription runs a forwarder task that copies notifications from
//! the hub into the session's outbound queue. Every topic is built from the
//! tenant bound at upgrade time.
//!
//! A staff token is verified once at upgrade; the ping tick closes the
//! connection once it has expired.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::message::{ClientCommand, ServerMessage, Topic};
use shared::models::TenantId;
use std::collections::HashMap;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::Duration;

use crate::auth::{Identity, Role, verify_token};
use crate::live::Subscription;
use crate::state::AppState;
use crate::tenant::TenantContext;

const PING_INTERVAL: Duration = Duration::from_secs(30);
const OUTBOUND_BUFFER: usize = 64;
const MAX_SUBSCRIPTIONS: usize = 32;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    token: Option<String>,
}

/// GET /ws
pub async fn handle_ws(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response, AppError> {
    // a bad token is refused before the upgrade
    let identity = match query.token.as_deref() {
        Some(token) => {
            let claims = verify_token(token, &state.jwt_secret)?;
            Some(Identity::authorize(claims, tenant.tenant_id)?)
        }
        None => None,
    };

    Ok(ws.on_upgrade(move |socket| run_session(socket, state, tenant.tenant_id, identity)))
}

async fn run_session(
    socket: WebSocket,
    state: AppState,
    tenant: TenantId,
    identity: Option<Identity>,
) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut outbound) = mpsc::channel(OUTBOUND_BUFFER);
    let role = identity.as_ref().map(|i| i.role);
    let mut session = Session::new(state, tenant, identity, tx);

    tracing::info!(tenant_id = %tenant, role = ?role, "WebSocket connected");

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if session.credentials_expired(chrono::Utc::now().timestamp()) {
                    tracing::info!(tenant_id = %tenant, role = ?role, "WebSocket token expired, closing");
                    let _ = send_message(&mut sink, &session.expired_message()).await;
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }

            Some(msg) = outbound.recv() => {
                if send_message(&mut sink, &msg).await.is_err() {
                    break;
                }
            }

            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        let reply = match serde_json::from_str::<ClientCommand>(&text) {
                            Ok(cmd) => session.handle_command(cmd).await,
                            Err(e) => ServerMessage::Error {
                                code: ErrorCode::InvalidFormat,
                                message: format!("Malformed command: {e}"),
                            },
                        };
                        if send_message(&mut sink, &reply).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    let topics = session.forwarders.len();
    drop(session);
    tracing::info!(tenant_id = %tenant, topics, "WebSocket disconnected");
}

/// Per-connection subscription state
pub(crate) struct Session {
    state: AppState,
    tenant: TenantId,
    identity: Option<Identity>,
    outbound: mpsc::Sender<ServerMessage>,
    forwarders: HashMap<Topic, JoinHandle<()>>,
}

impl Session {
    pub(crate) fn new(
        state: AppState,
        tenant: TenantId,
        identity: Option<Identity>,
        outbound: mpsc::Sender<ServerMessage>,
    ) -> Self {
        Self {
            state,
            tenant,
            identity,
            outbound,
            forwarders: HashMap::new(),
        }
    }

    /// True once a staff token has passed its expiry. Anonymous sessions
    /// never expire.
    pub(crate) fn credentials_expired(&self, now_secs: i64) -> bool {
        self.identity
            .as_ref()
            .is_some_and(|identity| identity.is_expired(now_secs))
    }

    fn expired_message(&self) -> ServerMessage {
        let err = AppError::token_expired();
        ServerMessage::Error {
            code: err.code,
            message: err.message,
        }
    }

    /// Apply one command; failures become an `error` reply
    pub(crate) async fn handle_command(&mut self, cmd: ClientCommand) -> ServerMessage {
        match self.apply(cmd).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::debug!(tenant_id = %self.tenant, code = %e.code, "WebSocket command rejected: {}", e.message);
                ServerMessage::Error {
                    code: e.code,
                    message: e.message,
                }
            }
        }
    }

    async fn apply(&mut self, cmd: ClientCommand) -> Result<ServerMessage, AppError> {
        match cmd {
            ClientCommand::SubscribeKitchen => {
                self.require(&[Role::Admin, Role::Kitchen])?;
                self.subscribe(Topic::Kitchen(self.tenant))
            }
            ClientCommand::SubscribeStaff => {
                self.require(&[Role::Admin, Role::Staff])?;
                self.subscribe(Topic::Staff(self.tenant))
            }
            ClientCommand::SubscribeTable { access_token } => {
                let table = self
                    .state
                    .tables
                    .resolve_token(self.tenant, &access_token)
                    .await?;
                self.subscribe(Topic::Table {
                    tenant_id: self.tenant,
                    table_id: table.id,
                })
            }
            ClientCommand::Unsubscribe { topic } => {
                let parsed = Topic::parse(&topic, self.tenant).ok_or_else(|| {
                    AppError::invalid_request(format!("Unknown topic: {topic}"))
                })?;
                if let Some(handle) = self.forwarders.remove(&parsed) {
                    handle.abort();
                }
                Ok(ServerMessage::Unsubscribed {
                    topic: parsed.to_string(),
                })
            }
            ClientCommand::CallStaff {
                access_token,
                call_type,
            } => {
                self.state
                    .tables
                    .call_staff(self.tenant, &access_token, call_type)
                    .await?;
                Ok(ServerMessage::CallAccepted)
            }
        }
    }

    fn require(&self, roles: &[Role]) -> Result<(), AppError> {
        match &self.identity {
            Some(identity) => identity.require(roles),
            None => Err(AppError::not_authenticated()),
        }
    }

    fn subscribe(&mut self, topic: Topic) -> Result<ServerMessage, AppError> {
        if topic.tenant_id() != self.tenant {
            return Err(AppError::tenant_mismatch());
        }
        if !self.forwarders.contains_key(&topic) {
            if self.forwarders.len() >= MAX_SUBSCRIPTIONS {
                return Err(AppError::with_message(
                    ErrorCode::ValueOutOfRange,
                    format!("At most {MAX_SUBSCRIPTIONS} subscriptions per connection"),
                ));
            }
            let subscription = self.state.hub.subscribe(topic);
            let handle = tokio::spawn(forward(subscription, self.outbound.clone()));
            self.forwarders.insert(topic, handle);
        }
        Ok(ServerMessage::Subscribed {
            topic: topic.to_string(),
        })
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        for (_, handle) in self.forwarders.drain() {
            handle.abort();
        }
    }
}

async fn forward(mut subscription: Subscription, outbound: mpsc::Sender<ServerMessage>) {
    let topic = subscription.topic();
    loop {
        match subscription.recv().await {
            Ok(payload) => {
                let msg = ServerMessage::Notification {
                    topic: topic.to_string(),
                    payload,
                };
                if outbound.send(msg).await.is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!(topic = %topic, skipped = n, "WebSocket subscriber lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn send_message<S>(sink: &mut S, msg: &ServerMessage) -> Result<(), ()>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    let json = serde_json::to_string(msg).map_err(|_| ())?;
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}
