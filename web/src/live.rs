//! Live sensor stream.
//!
//! A page that shows gauges creates one [`SensorHub`]: a single Socket.IO
//! connection whose events fan out to one signal per sensor.  The socket is
//! closed when the page unmounts.

use leptos::logging::{log, warn};
use leptos::prelude::*;

use hydrowatch_common::notification::Notification;
use hydrowatch_common::sensor::{LiveValue, SensorKind};

use crate::state::AppContext;

pub const NEW_NOTIFICATION_EVENT: &str = "newNotification";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Connecting,
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, Copy)]
pub struct SensorHub {
    values: [RwSignal<LiveValue>; SensorKind::ALL.len()],
    pub status: RwSignal<LinkStatus>,
    /// Latest alert text raised by a reading, until dismissed.
    pub warning: RwSignal<Option<String>>,
}

impl SensorHub {
    /// Create the hub for the current page and provide it as context.
    pub fn provide(ctx: AppContext) -> Self {
        let hub = Self {
            values: std::array::from_fn(|_| RwSignal::new(LiveValue::default())),
            status: RwSignal::new(LinkStatus::Connecting),
            warning: RwSignal::new(None),
        };
        provide_context(hub);
        hub.start(ctx);
        hub
    }

    pub fn value(&self, kind: SensorKind) -> RwSignal<LiveValue> {
        let idx = SensorKind::ALL
            .iter()
            .position(|k| *k == kind)
            .unwrap_or_default();
        self.values[idx]
    }

    fn apply_live(&self, kind: SensorKind, data: &serde_json::Value) {
        let Some(reading) = hydrowatch_common::sensor::parse_socket_payload(data) else {
            warn!("Ignoring unreadable {} payload: {data}", kind.event());
            return;
        };
        self.value(kind).update(|v| v.apply_live(reading));
        if let Some(text) = kind.warning(reading.value) {
            self.warning.set(Some(text));
        }
    }

    fn backfill(&self, ctx: AppContext) {
        let Some(client) = ctx.client_untracked() else { return };
        let hub = *self;
        leptos::task::spawn_local(async move {
            match client.latest().await {
                Ok(latest) => {
                    for (kind, reading) in latest {
                        hub.value(kind).update(|v| {
                            v.apply_backfill(reading);
                        });
                    }
                }
                Err(e) => warn!("Sensor backfill failed: {e}"),
            }
        });
    }

    /// Route one decoded socket event.
    fn dispatch(&self, ctx: AppContext, name: &str, data: serde_json::Value) {
        if let Some(kind) = SensorKind::from_event(name) {
            self.apply_live(kind, &data);
        } else if name == NEW_NOTIFICATION_EVENT {
            match serde_json::from_value::<Notification>(data) {
                Ok(n) => {
                    ctx.feed.update(|f| f.push_front(n));
                    ctx.sync_approval();
                }
                Err(e) => warn!("Ignoring malformed notification event: {e}"),
            }
        }
    }

    #[cfg(feature = "hydrate")]
    fn start(&self, ctx: AppContext) {
        let hub = *self;
        Effect::new(move |_| {
            let Some(config) = ctx.config.get() else { return };
            if config.sensor_backfill {
                hub.backfill(ctx);
            }
            match open_socket(hub, ctx, &config.socket_url) {
                Ok(socket) => {
                    let socket = StoredValue::new_local(Some(socket));
                    on_cleanup(move || {
                        socket.update_value(|s| {
                            if let Some(s) = s.take() {
                                s.close();
                            }
                        })
                    });
                }
                Err(e) => {
                    warn!("Live stream unavailable: {e}");
                    hub.status.set(LinkStatus::Disconnected);
                }
            }
        });
    }

    #[cfg(not(feature = "hydrate"))]
    fn start(&self, _ctx: AppContext) {}
}

/// An open socket together with the handlers it calls into.  The handlers
/// live exactly as long as the socket is attached to the page.
#[cfg(feature = "hydrate")]
struct LiveSocket {
    ws: web_sys::WebSocket,
    _onmessage: wasm_bindgen::closure::Closure<dyn FnMut(web_sys::MessageEvent)>,
    _onerror: wasm_bindgen::closure::Closure<dyn FnMut(web_sys::ErrorEvent)>,
    _onclose: wasm_bindgen::closure::Closure<dyn FnMut(web_sys::CloseEvent)>,
}

#[cfg(feature = "hydrate")]
impl LiveSocket {
    /// Detach the handlers before closing so none fires after they drop.
    fn close(self) {
        self.ws.set_onmessage(None);
        self.ws.set_onerror(None);
        self.ws.set_onclose(None);
        if let Err(e) = self.ws.close() {
            warn!("[live] close failed: {e:?}");
        }
    }
}

#[cfg(feature = "hydrate")]
fn open_socket(hub: SensorHub, ctx: AppContext, base: &str) -> Result<LiveSocket, String> {
    use hydrowatch_common::socketio::{handle_frame, socket_url, Incoming, SocketPacket};
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;
    use web_sys::{CloseEvent, ErrorEvent, MessageEvent, WebSocket};

    let url = socket_url(base).map_err(|e| e.to_string())?;
    log!("[live] connecting to {url}");
    let ws = WebSocket::new(&url).map_err(|e| format!("cannot open {url}: {e:?}"))?;

    let onmessage = {
        let sender = ws.clone();
        let onmessage: Closure<dyn FnMut(MessageEvent)> = Closure::new(move |e: MessageEvent| {
            let Some(frame) = e.data().as_string() else { return };
            match handle_frame(&frame) {
                Ok(Incoming::Opened(_)) => {
                    let _ = sender.send_with_str(&SocketPacket::connect().to_frame());
                }
                Ok(Incoming::Connected) => hub.status.set(LinkStatus::Connected),
                Ok(Incoming::Reply(reply)) => {
                    let _ = sender.send_with_str(&reply);
                }
                Ok(Incoming::Event { name, data }) => hub.dispatch(ctx, &name, data),
                Ok(Incoming::Rejected(reason)) => {
                    warn!("[live] connection refused: {reason}");
                    hub.status.set(LinkStatus::Disconnected);
                }
                Ok(Incoming::Closed) => hub.status.set(LinkStatus::Disconnected),
                Ok(Incoming::Ignore) => {}
                Err(e) => warn!("[live] {e}"),
            }
        });
        ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        onmessage
    };

    let onerror = {
        let onerror: Closure<dyn FnMut(ErrorEvent)> = Closure::new(move |e: ErrorEvent| {
            warn!("[live] error: {}", e.message());
        });
        ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror
    };

    let onclose = {
        let onclose: Closure<dyn FnMut(CloseEvent)> = Closure::new(move |e: CloseEvent| {
            log!("[live] close code={} reason='{}'", e.code(), e.reason());
            hub.status.set(LinkStatus::Disconnected);
        });
        ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));
        onclose
    };

    Ok(LiveSocket { ws, _onmessage: onmessage, _onerror: onerror, _onclose: onclose })
}

pub fn use_sensor_hub() -> SensorHub {
    expect_context::<SensorHub>()
}
