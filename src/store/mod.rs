mod memory;

pub use memory::MemoryStore;

use crate::error::Result;
use crate::policy::{FleetUpdatePolicy, PolicySpec};
use crate::types::*;

/// Store defines the persistence interface for the control plane. The
/// in-process [`MemoryStore`] backs it by default; a transactional store
/// plugs in behind the same boundary.
pub trait Store: Send + Sync {
    // Tenant operations
    fn create_tenant(&self, tenant: Tenant) -> Result<Tenant>;
    fn update_tenant(&self, id: &str, tenant: Tenant) -> Result<Tenant>;
    fn get_tenant(&self, id: &str) -> Result<Option<Tenant>>;
    fn list_tenants(&self) -> Result<Vec<Tenant>>;

    // Join token operations
    fn create_join_token(&self, tenant_id: &str, ttl_minutes: i64, one_time: bool)
    -> Result<JoinToken>;
    /// Stores a token with a caller-provided secret and expiry. Used for
    /// pre-shared bootstrap secrets where agent and server agree on the
    /// token out of band.
    fn create_join_token_with_secret(&self, token: JoinToken) -> Result<JoinToken>;
    /// Validates a raw token value. One-time tokens are consumed (deleted)
    /// and expired tokens are deleted as part of the same atomic step; the
    /// expired error carries the matched token and tenant so the
    /// registration path can capture the attempt.
    fn validate_join_token(&self, token: &str) -> Result<JoinToken>;
    fn list_join_tokens(&self, tenant_id: &str) -> Result<Vec<JoinToken>>;
    fn revoke_join_token(&self, id: &str) -> Result<bool>;

    // Agent operations
    fn register_agent(&self, agent: Agent) -> Result<()>;
    fn get_agent(&self, agent_id: &str) -> Result<Option<Agent>>;

    // Pending registration operations
    fn create_pending_registration(&self, reg: PendingAgentRegistration) -> Result<i64>;
    fn get_pending_registration(&self, id: i64) -> Result<Option<PendingAgentRegistration>>;
    fn list_pending_registrations(
        &self,
        status: Option<PendingStatus>,
    ) -> Result<Vec<PendingAgentRegistration>>;
    fn approve_pending_registration(&self, id: i64, tenant_id: &str, reviewed_by: &str)
    -> Result<()>;
    fn reject_pending_registration(&self, id: i64, reviewed_by: &str, notes: &str) -> Result<()>;
    fn delete_pending_registration(&self, id: i64) -> Result<bool>;

    // Update policy operations (keyed by tenant ID or the global sentinel)
    fn get_update_policy(&self, tenant_id: &str) -> Result<Option<FleetUpdatePolicy>>;
    fn upsert_update_policy(&self, tenant_id: &str, spec: PolicySpec) -> Result<FleetUpdatePolicy>;
    fn delete_update_policy(&self, tenant_id: &str) -> Result<()>;
    fn list_update_policies(&self) -> Result<Vec<FleetUpdatePolicy>>;
}
