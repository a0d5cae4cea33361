//! Async runtime layer: tournament registry, per-room tasks, published
//! snapshots and the append-only log.

pub mod audit_log;
pub mod context;
pub mod registry;
pub mod room_actor;
pub mod snapshot;

pub use audit_log::{AuditLog, LogRecord};
pub use context::TournamentContext;
pub use registry::Registry;
pub use room_actor::{RoomCommand, RoomHandle, RoomView};
pub use snapshot::SnapshotCell;
