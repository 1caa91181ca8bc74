//! Lifecycle event fan-out. The server emits events (agent registered,
//! pending registration created/approved/rejected/deleted) to an injected
//! sink so higher layers can forward them without this crate importing
//! them. Emission is best-effort and happens after the state change.

use serde_json::Value;

pub const EVENT_AGENT_REGISTERED: &str = "agent_registered";
pub const EVENT_PENDING_CREATED: &str = "pending_registration_created";
pub const EVENT_PENDING_APPROVED: &str = "pending_registration_approved";
pub const EVENT_PENDING_REJECTED: &str = "pending_registration_rejected";
pub const EVENT_PENDING_DELETED: &str = "pending_registration_deleted";

pub trait EventSink: Send + Sync {
    fn emit(&self, event: &str, data: Value);
}

/// Default sink: debug log lines through `tracing`.
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: &str, data: Value) {
        tracing::debug!(target: "drover::events", event, data = %data, "lifecycle event");
    }
}
