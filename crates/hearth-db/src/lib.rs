//! Realtime-database mirror engine.
//!
//! Keeps a local [`serde_json::Value`] tree synchronized with a remote
//! realtime-database service over a persistent duplex text connection.
//! The remote pushes incremental patches (full replace or relative merge)
//! which are applied to the local mirror with the service's own
//! semantics, so local reads are always consistent with the last patch
//! received. Outbound writes are echoed locally before transmission.
//!
//! The engine is sans-transport: the host owns the connection and the
//! event loop, and wires them to the engine through the [`Transport`] and
//! [`Scheduler`] traits plus the [`Database::handle_frame`] /
//! [`Database::handle_timer`] entry points. All state lives on one
//! logical thread; the engine never blocks and holds no locks.

pub mod config;
pub mod database;
pub mod envelope;
pub mod scheduler;
mod session;
pub mod transport;

pub use config::DatabaseConfig;
pub use database::{Database, KEEPALIVE_INTERVAL};
pub use hearth_tree::TreeError;
pub use scheduler::{Scheduler, TimerToken};
pub use transport::{Frame, Opcode, Transport};
