//! The mirror engine: inbound dispatch, outbound publish, keepalive.
//!
//! A [`Database`] owns the mirrored tree and is driven entirely by its
//! host event loop: the host calls [`Database::handle_frame`] when the
//! transport delivers a frame and [`Database::handle_timer`] when an
//! armed timer fires. The engine reacts and returns; it never blocks.

use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use hearth_tree::{apply, path, resolve, TreeError, DEFAULT_MAX_DEPTH};

use crate::config::DatabaseConfig;
use crate::envelope::{self, ConnectionKind, DataAction, Inbound};
use crate::scheduler::{Scheduler, TimerToken};
use crate::session::SessionState;
use crate::transport::{Frame, Opcode, Transport};

/// Fixed heartbeat period. No backoff, no jitter.
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_millis(45_000);

/// Literal heartbeat payload; not an envelope.
const KEEPALIVE_PAYLOAD: &str = "0";

/// A locally mirrored realtime-database tree.
pub struct Database<T: Transport, S: Scheduler> {
    config: DatabaseConfig,
    transport: T,
    scheduler: S,
    root: Value,
    session: SessionState,
    keepalive_timer: Option<TimerToken>,
    max_depth: usize,
}

impl<T: Transport, S: Scheduler> Database<T, S> {
    /// The mirror starts as an empty object and lives for the engine's
    /// lifetime; it is only ever replaced wholesale by a root patch.
    pub fn new(config: DatabaseConfig, transport: T, scheduler: S) -> Self {
        Database {
            config,
            transport,
            scheduler,
            root: Value::Object(Map::new()),
            session: SessionState::new(),
            keepalive_timer: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Starts the keepalive cycle: one heartbeat immediately, then one per
    /// [`KEEPALIVE_INTERVAL`]. Call once the transport is connected.
    pub fn connect(&mut self) {
        self.cancel_keepalive();
        self.send_keepalive();
    }

    /// Cancels the pending keepalive so no timer can fire into a dead
    /// connection. The mirror and session state are kept.
    pub fn disconnect(&mut self) {
        self.cancel_keepalive();
    }

    /// Registers the callback invoked after each applied data frame,
    /// replacing any previous one.
    pub fn set_update_handler(&mut self, callback: impl FnMut() + 'static) {
        self.session.set_update_callback(Box::new(callback));
    }

    /// Reads the value at `path`. Returns a copy: the mirror may change
    /// under any later frame, so references into it are never handed out.
    /// `None` if any segment is missing or an intermediate node is not an
    /// object.
    pub fn get(&self, path: &str) -> Option<Value> {
        resolve::lookup(&self.root, &path::parse(path)).cloned()
    }

    /// Writes `value` at `path`: the write is applied to the local mirror
    /// first (read-your-write; no acknowledgment reconciliation), then
    /// encoded and sent. Returns the assigned request id.
    pub fn publish(&mut self, path_str: &str, value: Value) -> Result<u64, TreeError> {
        let request_id = self.session.allocate_request_id();
        let payload = envelope::encode_publish(request_id, path_str, &value);
        apply::replace(&mut self.root, &path::parse(path_str), value, self.max_depth)?;
        self.transport.send_text(&payload);
        Ok(request_id)
    }

    /// The host the service most recently reported for itself, from a
    /// host-info or redirect connection command. Reconnection after a
    /// redirect is the caller's decision; the engine only records it.
    pub fn real_host(&self) -> Option<&str> {
        self.session.real_host.as_deref()
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Entry point for every frame the transport delivers. Only text
    /// frames are protocol-meaningful; ping/pong/close/continuation and
    /// binary frames are transport concerns.
    pub fn handle_frame(&mut self, frame: Frame) {
        match frame.opcode {
            Opcode::Text => self.on_text(&frame.payload),
            opcode => trace!(?opcode, "ignoring non-text frame"),
        }
    }

    /// Entry point for fired timers.
    pub fn handle_timer(&mut self, token: TimerToken) {
        if self.keepalive_timer == Some(token) {
            self.send_keepalive();
        }
    }

    fn on_text(&mut self, payload: &[u8]) {
        let parsed: Value = match serde_json::from_slice(payload) {
            Ok(parsed) => parsed,
            Err(error) => {
                debug!(%error, "dropping unparseable frame");
                return;
            }
        };
        match envelope::decode(parsed) {
            Some(Inbound::Connection { kind, host }) => self.on_connection(kind, host),
            Some(Inbound::Data {
                request_id,
                action,
                path,
                value,
            }) => self.on_data(request_id, action, &path, value),
            None => debug!("dropping malformed frame"),
        }
    }

    fn on_connection(&mut self, kind: ConnectionKind, host: String) {
        debug!(%host, ?kind, "connection command updated real host");
        if kind == ConnectionKind::Redirect {
            // Recorded only; the caller decides whether to reconnect.
            trace!("redirect received, reconnection left to the caller");
        }
        self.session.real_host = Some(host);
    }

    // The request id is currently inert: validated by the decoder but
    // matched against nothing.
    fn on_data(
        &mut self,
        _request_id: Option<u64>,
        action: DataAction,
        path_str: &str,
        value: Value,
    ) {
        let segments = path::parse(path_str);
        let applied = match action {
            DataAction::Replace => apply::replace(&mut self.root, &segments, value, self.max_depth),
            DataAction::Merge => apply::merge(&mut self.root, &segments, value, self.max_depth),
        };
        match applied {
            // Once per frame, after mutation and prune. Never per merge
            // sub-key, and never for a dropped frame.
            Ok(()) => self.session.notify_update(),
            Err(error) => debug!(%error, path = path_str, "dropping data frame"),
        }
    }

    fn send_keepalive(&mut self) {
        self.transport.send_text(KEEPALIVE_PAYLOAD);
        self.keepalive_timer = Some(self.scheduler.run_delayed(KEEPALIVE_INTERVAL));
    }

    fn cancel_keepalive(&mut self) {
        if let Some(token) = self.keepalive_timer.take() {
            self.scheduler.cancel(token);
        }
    }
}

impl<T: Transport, S: Scheduler> Drop for Database<T, S> {
    fn drop(&mut self) {
        // The scheduler guarantees a cancelled callback never runs, so a
        // pending keepalive cannot fire into a destroyed engine.
        self.cancel_keepalive();
    }
}
