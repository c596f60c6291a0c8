//! Socket.IO (v5) over Engine.IO (v4), websocket transport only.
//!
//! Just enough of the protocol for a read-mostly event subscriber: the
//! handshake, heartbeats, namespace connect and `["event", data]` frames.
//! Binary attachments are not supported.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// `open` payload sent by the server as the first frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    #[serde(default = "default_ping_interval")]
    pub ping_interval: u64,
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_payload: Option<u64>,
}

fn default_ping_interval() -> u64 {
    25_000
}

fn default_ping_timeout() -> u64 {
    20_000
}

// ─── Engine.IO ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping(String),
    Pong(String),
    Message(String),
    Upgrade,
    Noop,
}

impl EnginePacket {
    pub fn decode(frame: &str) -> Result<Self> {
        let mut chars = frame.chars();
        let kind = chars
            .next()
            .ok_or_else(|| Error::Protocol("empty engine.io frame".into()))?;
        let body = chars.as_str();
        Ok(match kind {
            '0' => {
                let hs = serde_json::from_str(body)
                    .map_err(|e| Error::Protocol(format!("bad handshake: {e}")))?;
                EnginePacket::Open(hs)
            }
            '1' => EnginePacket::Close,
            '2' => EnginePacket::Ping(body.to_string()),
            '3' => EnginePacket::Pong(body.to_string()),
            '4' => EnginePacket::Message(body.to_string()),
            '5' => EnginePacket::Upgrade,
            '6' => EnginePacket::Noop,
            other => {
                return Err(Error::Protocol(format!("unknown engine.io packet type {other:?}")))
            }
        })
    }

    pub fn encode(&self) -> String {
        match self {
            EnginePacket::Open(hs) => {
                format!("0{}", serde_json::to_string(hs).unwrap_or_default())
            }
            EnginePacket::Close => "1".into(),
            EnginePacket::Ping(p) => format!("2{p}"),
            EnginePacket::Pong(p) => format!("3{p}"),
            EnginePacket::Message(m) => format!("4{m}"),
            EnginePacket::Upgrade => "5".into(),
            EnginePacket::Noop => "6".into(),
        }
    }
}

// ─── Socket.IO ───────────────────────────────────────────────────────────────

pub const DEFAULT_NAMESPACE: &str = "/";

#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect {
        namespace: String,
        data: Option<Value>,
    },
    Disconnect {
        namespace: String,
    },
    Event {
        namespace: String,
        id: Option<u64>,
        name: String,
        args: Vec<Value>,
    },
    Ack {
        namespace: String,
        id: u64,
        args: Vec<Value>,
    },
    ConnectError {
        namespace: String,
        message: String,
    },
}

impl SocketPacket {
    pub fn connect() -> Self {
        SocketPacket::Connect {
            namespace: DEFAULT_NAMESPACE.into(),
            data: None,
        }
    }

    pub fn event(name: &str, args: Vec<Value>) -> Self {
        SocketPacket::Event {
            namespace: DEFAULT_NAMESPACE.into(),
            id: None,
            name: name.into(),
            args,
        }
    }

    /// Decode the payload of an Engine.IO `message` packet.
    pub fn decode(payload: &str) -> Result<Self> {
        let mut rest = payload;
        let kind = take_char(&mut rest)?;
        if matches!(kind, '5' | '6') {
            return Err(Error::Protocol("binary socket.io packets are not supported".into()));
        }

        let namespace = if rest.starts_with('/') {
            let end = rest.find(',').unwrap_or(rest.len());
            let ns = rest[..end].to_string();
            rest = rest.get(end + 1..).unwrap_or("");
            ns
        } else {
            DEFAULT_NAMESPACE.to_string()
        };

        let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
        let id = if digits > 0 {
            let id = rest[..digits]
                .parse()
                .map_err(|e| Error::Protocol(format!("bad ack id: {e}")))?;
            rest = &rest[digits..];
            Some(id)
        } else {
            None
        };

        let data: Option<Value> = if rest.trim().is_empty() {
            None
        } else {
            Some(
                serde_json::from_str(rest)
                    .map_err(|e| Error::Protocol(format!("bad socket.io payload: {e}")))?,
            )
        };

        match kind {
            '0' => Ok(SocketPacket::Connect { namespace, data }),
            '1' => Ok(SocketPacket::Disconnect { namespace }),
            '2' => {
                let mut args = match data {
                    Some(Value::Array(items)) => items,
                    _ => return Err(Error::Protocol("event payload must be an array".into())),
                };
                if args.is_empty() {
                    return Err(Error::Protocol("event without a name".into()));
                }
                let name = match args.remove(0) {
                    Value::String(s) => s,
                    other => return Err(Error::Protocol(format!("event name must be a string, got {other}"))),
                };
                Ok(SocketPacket::Event { namespace, id, name, args })
            }
            '3' => {
                let id = id.ok_or_else(|| Error::Protocol("ack without id".into()))?;
                let args = match data {
                    Some(Value::Array(items)) => items,
                    _ => Vec::new(),
                };
                Ok(SocketPacket::Ack { namespace, id, args })
            }
            '4' => {
                let message = match &data {
                    Some(Value::Object(o)) => o
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or("connection refused")
                        .to_string(),
                    Some(Value::String(s)) => s.clone(),
                    _ => "connection refused".to_string(),
                };
                Ok(SocketPacket::ConnectError { namespace, message })
            }
            other => Err(Error::Protocol(format!("unknown socket.io packet type {other:?}"))),
        }
    }

    /// Encode as an Engine.IO message payload (without the leading `4`).
    pub fn encode(&self) -> String {
        fn ns(namespace: &str) -> String {
            if namespace == DEFAULT_NAMESPACE {
                String::new()
            } else {
                format!("{namespace},")
            }
        }
        match self {
            SocketPacket::Connect { namespace, data } => match data {
                Some(d) => format!("0{}{d}", ns(namespace)),
                None => format!("0{}", ns(namespace)),
            },
            SocketPacket::Disconnect { namespace } => format!("1{}", ns(namespace)),
            SocketPacket::Event { namespace, id, name, args } => {
                let mut items = Vec::with_capacity(args.len() + 1);
                items.push(Value::String(name.clone()));
                items.extend(args.iter().cloned());
                let id = id.map(|i| i.to_string()).unwrap_or_default();
                format!("2{}{id}{}", ns(namespace), Value::Array(items))
            }
            SocketPacket::Ack { namespace, id, args } => {
                format!("3{}{id}{}", ns(namespace), Value::Array(args.clone()))
            }
            SocketPacket::ConnectError { namespace, message } => {
                format!("4{}{}", ns(namespace), serde_json::json!({ "message": message }))
            }
        }
    }

    /// Full websocket text frame (`4` + payload).
    pub fn to_frame(&self) -> String {
        EnginePacket::Message(self.encode()).encode()
    }
}

fn take_char(rest: &mut &str) -> Result<char> {
    let mut chars = rest.chars();
    let c = chars
        .next()
        .ok_or_else(|| Error::Protocol("empty socket.io packet".into()))?;
    *rest = chars.as_str();
    Ok(c)
}

// ─── Frames seen by a subscriber ─────────────────────────────────────────────

/// What a subscriber should do with one incoming websocket text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    /// Engine.IO handshake done; send [`SocketPacket::connect`].
    Opened(Handshake),
    /// Namespace joined.
    Connected,
    /// Answer with this frame.
    Reply(String),
    Event { name: String, data: Value },
    Rejected(String),
    Closed,
    Ignore,
}

/// Classify an incoming frame.
pub fn handle_frame(frame: &str) -> Result<Incoming> {
    Ok(match EnginePacket::decode(frame)? {
        EnginePacket::Open(hs) => Incoming::Opened(hs),
        EnginePacket::Ping(p) => Incoming::Reply(EnginePacket::Pong(p).encode()),
        EnginePacket::Close => Incoming::Closed,
        EnginePacket::Message(payload) => match SocketPacket::decode(&payload)? {
            SocketPacket::Connect { .. } => Incoming::Connected,
            SocketPacket::Disconnect { .. } => Incoming::Closed,
            SocketPacket::Event { name, mut args, .. } => Incoming::Event {
                name,
                data: if args.is_empty() { Value::Null } else { args.remove(0) },
            },
            SocketPacket::ConnectError { message, .. } => Incoming::Rejected(message),
            SocketPacket::Ack { .. } => Incoming::Ignore,
        },
        EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => Incoming::Ignore,
    })
}

/// Websocket endpoint for a backend base URL:
/// `http://h:5000` becomes `ws://h:5000/socket.io/?EIO=4&transport=websocket`.
pub fn socket_url(base: &str) -> Result<String> {
    let base = base.trim().trim_end_matches('/');
    let (scheme, rest) = base
        .split_once("://")
        .ok_or_else(|| Error::Config(format!("socket url without scheme: {base:?}")))?;
    let ws = match scheme {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(Error::Config(format!("unsupported socket scheme {other:?}"))),
    };
    if rest.is_empty() {
        return Err(Error::Config(format!("socket url without host: {base:?}")));
    }
    Ok(format!("{ws}://{rest}/socket.io/?EIO=4&transport=websocket"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_handshake() {
        let frame = r#"0{"sid":"abc","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;
        match handle_frame(frame).unwrap() {
            Incoming::Opened(hs) => {
                assert_eq!(hs.sid, "abc");
                assert_eq!(hs.ping_interval, 25000);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_ping_is_answered() {
        assert_eq!(handle_frame("2").unwrap(), Incoming::Reply("3".into()));
        assert_eq!(handle_frame("2probe").unwrap(), Incoming::Reply("3probe".into()));
    }

    #[test]
    fn test_event_frame() {
        let got = handle_frame(r#"42["updateECData",{"value":72}]"#).unwrap();
        assert_eq!(
            got,
            Incoming::Event { name: "updateECData".into(), data: json!({"value": 72}) }
        );
    }

    #[test]
    fn test_namespace_and_ack_id() {
        let p = SocketPacket::decode(r#"2/sensors,17["updatePHData",7.2]"#).unwrap();
        assert_eq!(
            p,
            SocketPacket::Event {
                namespace: "/sensors".into(),
                id: Some(17),
                name: "updatePHData".into(),
                args: vec![json!(7.2)],
            }
        );
        assert_eq!(p.encode(), r#"2/sensors,17["updatePHData",7.2]"#);
    }

    #[test]
    fn test_connect_and_errors() {
        assert_eq!(SocketPacket::connect().to_frame(), "40");
        assert_eq!(handle_frame(r#"40{"sid":"x"}"#).unwrap(), Incoming::Connected);
        assert_eq!(
            handle_frame(r#"44{"message":"Not authorized"}"#).unwrap(),
            Incoming::Rejected("Not authorized".into())
        );
        assert!(handle_frame("").is_err());
        assert!(handle_frame("9").is_err());
        assert!(handle_frame(r#"42{"not":"array"}"#).is_err());
        assert!(handle_frame("451-[\"bin\"]").is_err());
        assert_eq!(handle_frame("6").unwrap(), Incoming::Ignore);
        assert_eq!(handle_frame("1").unwrap(), Incoming::Closed);
    }

    #[test]
    fn test_event_encoding() {
        let frame = SocketPacket::event("subscribe", vec![json!("ph")]).to_frame();
        assert_eq!(frame, r#"42["subscribe","ph"]"#);
    }

    #[test]
    fn test_socket_url() {
        assert_eq!(
            socket_url("http://localhost:5000/").unwrap(),
            "ws://localhost:5000/socket.io/?EIO=4&transport=websocket"
        );
        assert_eq!(
            socket_url("https://water.example.org").unwrap(),
            "wss://water.example.org/socket.io/?EIO=4&transport=websocket"
        );
        assert!(socket_url("localhost:5000").is_err());
        assert!(socket_url("ftp://x").is_err());
    }
}
