//! Socket.IO client over the Engine.IO v4 websocket transport.
//!
//! Only the subset the dashboard needs: the default namespace, text events,
//! ping/pong keep-alive and outbound `join_search` emits.
//!
//! Wire framing:
//!
//! ```text
//! 0{"sid":"...","pingInterval":25000,...}   engine.io OPEN
//! 40                                        socket.io CONNECT (default namespace)
//! 2 / 3                                     engine.io PING / PONG
//! 42["scraping_success",{...}]              socket.io EVENT
//! ```

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};
use url::Url;

use argus_common::error::{ArgusError, Result};
use argus_common::events::PushEvent;
use argus_common::transport::EventChannel;

// ── Engine.IO packets ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(Value),
    Close,
    Ping(String),
    Pong(String),
    Message(String),
    Upgrade,
    Noop,
}

pub fn decode_engine(frame: &str) -> Result<EnginePacket> {
    let mut chars = frame.chars();
    let kind = chars
        .next()
        .ok_or_else(|| ArgusError::Protocol("empty engine.io frame".into()))?;
    let body = chars.as_str();

    Ok(match kind {
        '0' => EnginePacket::Open(serde_json::from_str(body)?),
        '1' => EnginePacket::Close,
        '2' => EnginePacket::Ping(body.to_string()),
        '3' => EnginePacket::Pong(body.to_string()),
        '4' => EnginePacket::Message(body.to_string()),
        '5' => EnginePacket::Upgrade,
        '6' => EnginePacket::Noop,
        other => {
            return Err(ArgusError::Protocol(format!("unknown engine.io packet type {:?}", other)))
        }
    })
}

pub fn encode_engine(packet: &EnginePacket) -> String {
    match packet {
        EnginePacket::Open(v) => format!("0{}", v),
        EnginePacket::Close => "1".to_string(),
        EnginePacket::Ping(p) => format!("2{}", p),
        EnginePacket::Pong(p) => format!("3{}", p),
        EnginePacket::Message(m) => format!("4{}", m),
        EnginePacket::Upgrade => "5".to_string(),
        EnginePacket::Noop => "6".to_string(),
    }
}

// ── Socket.IO packets ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect(Option<Value>),
    Disconnect,
    Event { name: String, data: Value, ack: Option<u64> },
    Ack { id: u64, data: Value },
    ConnectError(Value),
}

/// Decode the payload of an engine.io MESSAGE packet.
pub fn decode_socket(payload: &str) -> Result<SocketPacket> {
    let mut chars = payload.chars();
    let kind = chars
        .next()
        .ok_or_else(|| ArgusError::Protocol("empty socket.io packet".into()))?;
    let mut rest = chars.as_str();

    // Namespaced packets look like `2/admin,[...]`; we only speak the default
    // namespace but still strip the prefix so decoding stays well-formed.
    if rest.starts_with('/') {
        rest = match rest.find(',') {
            Some(idx) => &rest[idx + 1..],
            None => "",
        };
    }

    let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    let ack = if digits > 0 { rest[..digits].parse().ok() } else { None };
    let body = &rest[digits..];

    match kind {
        '0' => Ok(SocketPacket::Connect(if body.is_empty() {
            None
        } else {
            Some(serde_json::from_str(body)?)
        })),
        '1' => Ok(SocketPacket::Disconnect),
        '2' => {
            let (name, data) = split_event(body)?;
            Ok(SocketPacket::Event { name, data, ack })
        }
        '3' => {
            let id = ack.ok_or_else(|| ArgusError::Protocol("ack without id".into()))?;
            let data = if body.is_empty() { Value::Null } else { serde_json::from_str(body)? };
            Ok(SocketPacket::Ack { id, data })
        }
        '4' => Ok(SocketPacket::ConnectError(if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(body)?
        })),
        other => Err(ArgusError::Protocol(format!("unsupported socket.io packet type {:?}", other))),
    }
}

fn split_event(body: &str) -> Result<(String, Value)> {
    let Value::Array(mut items) = serde_json::from_str(body)? else {
        return Err(ArgusError::Protocol("event payload is not an array".into()));
    };
    if items.is_empty() {
        return Err(ArgusError::Protocol("event payload has no name".into()));
    }
    let name = match items.remove(0) {
        Value::String(s) => s,
        other => return Err(ArgusError::Protocol(format!("event name is not a string: {}", other))),
    };
    let data = if items.is_empty() { Value::Null } else { items.remove(0) };
    Ok((name, data))
}

/// Full wire frame for an outbound event on the default namespace.
pub fn encode_event(name: &str, data: &Value) -> String {
    let body = Value::Array(vec![Value::String(name.to_string()), data.clone()]);
    encode_engine(&EnginePacket::Message(format!("2{}", body)))
}

pub fn encode_connect() -> String {
    encode_engine(&EnginePacket::Message("0".to_string()))
}

/// `http://host:5000` → `ws://host:5000/socket.io/?EIO=4&transport=websocket`
pub fn socket_url(base: &Url) -> Result<Url> {
    let mut url = base
        .join("/socket.io/")
        .map_err(|e| ArgusError::Config(format!("Invalid socket URL: {}", e)))?;
    let scheme = match url.scheme() {
        "https" | "wss" => "wss",
        _ => "ws",
    };
    url.set_scheme(scheme)
        .map_err(|_| ArgusError::Config(format!("Cannot use {} as a websocket origin", base)))?;
    url.set_query(Some("EIO=4&transport=websocket"));
    Ok(url)
}

/// Translate one inbound frame into what the client must do about it.
#[derive(Debug, PartialEq)]
pub enum FrameAction {
    Reply(String),
    Deliver(PushEvent),
    Closed,
    Ignore,
}

pub fn handle_frame(frame: &str) -> Result<FrameAction> {
    Ok(match decode_engine(frame)? {
        EnginePacket::Open(_) => FrameAction::Reply(encode_connect()),
        EnginePacket::Ping(p) => FrameAction::Reply(encode_engine(&EnginePacket::Pong(p))),
        EnginePacket::Close => FrameAction::Closed,
        EnginePacket::Message(payload) => match decode_socket(&payload)? {
            SocketPacket::Connect(_) => FrameAction::Deliver(PushEvent::Connect),
            SocketPacket::Event { name, data, .. } => match PushEvent::decode(&name, data) {
                Some(event) => FrameAction::Deliver(event),
                None => {
                    debug!(event = %name, "ignoring unhandled push event");
                    FrameAction::Ignore
                }
            },
            SocketPacket::ConnectError(err) => {
                warn!(error = %err, "socket.io connect rejected");
                FrameAction::Closed
            }
            SocketPacket::Disconnect => FrameAction::Closed,
            SocketPacket::Ack { .. } => FrameAction::Ignore,
        },
        EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => FrameAction::Ignore,
    })
}

// ── Client ────────────────────────────────────────────────────────────────────

const RECONNECT_INITIAL: Duration = Duration::from_secs(1);
const RECONNECT_MAX: Duration = Duration::from_secs(30);
const EVENT_BUFFER: usize = 256;

/// Doubling retry delay, capped at [`RECONNECT_MAX`].
pub fn next_backoff(current: Duration) -> Duration {
    (current * 2).min(RECONNECT_MAX)
}

/// Frames that re-enter every joined room on a fresh connection.
pub fn rejoin_frames(rooms: &[String]) -> Vec<String> {
    rooms.iter().map(|id| join_frame(id)).collect()
}

fn join_frame(search_id: &str) -> String {
    encode_event("join_search", &serde_json::json!({ "search_id": search_id }))
}

#[derive(Debug, Default)]
struct Shared {
    /// Writer of the live connection; `None` while disconnected.
    session: Option<mpsc::UnboundedSender<String>>,
    /// Every search joined so far, replayed after each reconnect.
    rooms: Vec<String>,
}

enum SessionEnd {
    Closed,
    ReceiverGone,
}

/// Handle of a self-healing Socket.IO connection.
#[derive(Debug, Clone, Default)]
pub struct SocketIoChannel {
    shared: Arc<Mutex<Shared>>,
}

impl SocketIoChannel {
    /// Start the connection supervisor and return at once. The socket is
    /// (re)established in the background with exponential backoff; decoded
    /// push events arrive on the returned receiver in wire order.
    pub fn spawn(base: &Url) -> Result<(Self, mpsc::Receiver<PushEvent>)> {
        let url = socket_url(base)?;
        let (event_tx, event_rx) = mpsc::channel::<PushEvent>(EVENT_BUFFER);
        let channel = Self::default();
        tokio::spawn(channel.clone().supervise(url, event_tx));
        Ok((channel, event_rx))
    }

    pub fn is_connected(&self) -> bool {
        self.shared().session.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    fn shared(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_session(&self, session: Option<mpsc::UnboundedSender<String>>) {
        self.shared().session = session;
    }

    async fn supervise(self, url: Url, events: mpsc::Sender<PushEvent>) {
        let mut delay = RECONNECT_INITIAL;
        loop {
            match self.run_session(&url, &events).await {
                Ok(SessionEnd::ReceiverGone) => {
                    self.set_session(None);
                    debug!("push event receiver dropped; stopping socket supervisor");
                    return;
                }
                Ok(SessionEnd::Closed) => {
                    delay = RECONNECT_INITIAL;
                    info!("push channel closed; reconnecting");
                }
                Err(e) => warn!(error = %e, retry_in = ?delay, "push channel unavailable"),
            }
            self.set_session(None);
            tokio::time::sleep(delay).await;
            delay = next_backoff(delay);
        }
    }

    async fn run_session(&self, url: &Url, events: &mpsc::Sender<PushEvent>) -> Result<SessionEnd> {
        let (ws, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| ArgusError::WebSocket(e.to_string()))?;
        info!(%url, "connected to push channel");

        let (mut sink, mut stream) = ws.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
        tokio::spawn(async move {
            while let Some(frame) = out_rx.recv().await {
                if let Err(e) = sink.send(Message::text(frame)).await {
                    warn!(error = %e, "push channel write failed");
                    break;
                }
            }
        });
        self.set_session(Some(out_tx.clone()));

        while let Some(msg) = stream.next().await {
            let text = match msg {
                Ok(Message::Text(t)) => t,
                Ok(Message::Close(_)) => break,
                Ok(_) => continue,
                Err(e) => {
                    warn!(error = %e, "push channel read failed");
                    break;
                }
            };
            match handle_frame(text.as_str()) {
                Ok(FrameAction::Reply(frame)) => {
                    let _ = out_tx.send(frame);
                }
                Ok(FrameAction::Deliver(event)) => {
                    if matches!(event, PushEvent::Connect) {
                        let rooms = self.shared().rooms.clone();
                        for frame in rejoin_frames(&rooms) {
                            let _ = out_tx.send(frame);
                        }
                    }
                    if events.send(event).await.is_err() {
                        return Ok(SessionEnd::ReceiverGone);
                    }
                }
                Ok(FrameAction::Closed) => break,
                Ok(FrameAction::Ignore) => {}
                Err(e) => debug!(error = %e, "skipping undecodable frame"),
            }
        }
        Ok(SessionEnd::Closed)
    }
}

#[async_trait]
impl EventChannel for SocketIoChannel {
    /// The room is remembered even while disconnected and is re-entered on the
    /// next connection; the error only reports that the join is deferred.
    async fn join(&self, search_id: &str) -> Result<()> {
        let session = {
            let mut shared = self.shared();
            if !shared.rooms.iter().any(|r| r == search_id) {
                shared.rooms.push(search_id.to_string());
            }
            shared.session.clone()
        };
        let tx = session.ok_or_else(|| ArgusError::WebSocket("push channel is not connected".into()))?;
        tx.send(join_frame(search_id))
            .map_err(|_| ArgusError::WebSocket("push channel is closed".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_open_triggers_namespace_connect() {
        let action = handle_frame(r#"0{"sid":"abc","pingInterval":25000,"pingTimeout":20000}"#).unwrap();
        assert_eq!(action, FrameAction::Reply("40".to_string()));
    }

    #[test]
    fn test_ping_is_answered_with_pong() {
        assert_eq!(handle_frame("2").unwrap(), FrameAction::Reply("3".to_string()));
        assert_eq!(handle_frame("2probe").unwrap(), FrameAction::Reply("3probe".to_string()));
    }

    #[test]
    fn test_namespace_connect_delivers_connect_event() {
        assert_eq!(
            handle_frame(r#"40{"sid":"xyz"}"#).unwrap(),
            FrameAction::Deliver(PushEvent::Connect)
        );
    }

    #[test]
    fn test_event_frame_decodes_push_event() {
        let action = handle_frame(r#"42["search_error",{"error":"timeout"}]"#).unwrap();
        match action {
            FrameAction::Deliver(PushEvent::SearchError(e)) => {
                assert_eq!(e.error.as_deref(), Some("timeout"))
            }
            other => panic!("expected search_error, got {:?}", other),
        }
    }

    #[test]
    fn test_event_with_ack_id_and_namespace() {
        let packet = decode_socket(r#"2/admin,17["osint_start",{"message":"go"}]"#).unwrap();
        assert_eq!(
            packet,
            SocketPacket::Event {
                name: "osint_start".into(),
                data: json!({"message": "go"}),
                ack: Some(17),
            }
        );
    }

    #[test]
    fn test_unhandled_event_is_ignored() {
        assert_eq!(
            handle_frame(r#"42["joined_search",{"search_id":"a"}]"#).unwrap(),
            FrameAction::Ignore
        );
    }

    #[test]
    fn test_encode_join_search() {
        let frame = encode_event("join_search", &json!({"search_id": "abc123"}));
        assert_eq!(frame, r#"42["join_search",{"search_id":"abc123"}]"#);
    }

    #[test]
    fn test_socket_url_from_http_base() {
        let base = Url::parse("https://intel.example.com:8443").unwrap();
        assert_eq!(
            socket_url(&base).unwrap().as_str(),
            "wss://intel.example.com:8443/socket.io/?EIO=4&transport=websocket"
        );
    }

    #[test]
    fn test_garbage_frames_are_errors() {
        assert!(decode_engine("").is_err());
        assert!(decode_engine("9zzz").is_err());
        assert!(handle_frame("42{not json").is_err());
    }

    #[test]
    fn test_backoff_doubles_up_to_cap() {
        assert_eq!(next_backoff(Duration::from_secs(1)), Duration::from_secs(2));
        assert_eq!(next_backoff(Duration::from_secs(16)), Duration::from_secs(30));
        assert_eq!(next_backoff(RECONNECT_MAX), RECONNECT_MAX);
    }

    #[test]
    fn test_rejoin_frames_cover_every_room() {
        let rooms = vec!["a1".to_string(), "b2".to_string()];
        assert_eq!(
            rejoin_frames(&rooms),
            vec![
                r#"42["join_search",{"search_id":"a1"}]"#.to_string(),
                r#"42["join_search",{"search_id":"b2"}]"#.to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_not_fatal() {
        let base = Url::parse("http://127.0.0.1:9").unwrap();
        let (channel, _events) = SocketIoChannel::spawn(&base).unwrap();
        assert!(!channel.is_connected());

        let err = channel.join("abc123").await.unwrap_err();
        assert!(matches!(err, ArgusError::WebSocket(_)));
        channel.join("abc123").await.unwrap_err();
        assert_eq!(channel.shared().rooms, vec!["abc123".to_string()]);
    }
}
