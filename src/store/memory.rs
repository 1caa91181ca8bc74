use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use chrono::{Duration, Utc};
use rand::RngCore;

use super::Store;
use crate::error::{Error, Result};
use crate::policy::{FleetUpdatePolicy, PolicySpec};
use crate::types::*;

const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;

/// Process-local store over mutex-protected maps. Every instance owns its
/// own lock, so tests can run isolated stores in parallel.
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    tenants: HashMap<String, Tenant>,
    /// Keyed by the raw token value; one-time consumption and lazy expiry
    /// are both removals.
    tokens: HashMap<String, JoinToken>,
    agents: HashMap<String, Agent>,
    pending: BTreeMap<i64, PendingAgentRegistration>,
    next_pending_id: i64,
    policies: HashMap<String, FleetUpdatePolicy>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_pending_id: 1,
                ..Default::default()
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock means a panic mid-mutation; propagating the data
        // is still safe because every mutation is a single map operation.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Cryptographically random hex string of `bytes * 2` characters.
fn random_hex(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

impl Store for MemoryStore {
    fn create_tenant(&self, mut tenant: Tenant) -> Result<Tenant> {
        if tenant.id.is_empty() {
            tenant.id = uuid::Uuid::new_v4().to_string();
        }
        tenant.created_at = Utc::now();
        tenant.login_domain = normalize_login_domain(&tenant.login_domain);

        let mut inner = self.lock();
        ensure_unique_domain(&inner.tenants, &tenant.id, &tenant.login_domain)?;
        inner.tenants.insert(tenant.id.clone(), tenant.clone());
        Ok(tenant)
    }

    fn update_tenant(&self, id: &str, mut tenant: Tenant) -> Result<Tenant> {
        tenant.login_domain = normalize_login_domain(&tenant.login_domain);

        let mut inner = self.lock();
        let existing = inner.tenants.get(id).ok_or(Error::TenantNotFound)?;
        tenant.id = existing.id.clone();
        tenant.created_at = existing.created_at;
        ensure_unique_domain(&inner.tenants, &tenant.id, &tenant.login_domain)?;
        inner.tenants.insert(tenant.id.clone(), tenant.clone());
        Ok(tenant)
    }

    fn get_tenant(&self, id: &str) -> Result<Option<Tenant>> {
        Ok(self.lock().tenants.get(id).cloned())
    }

    fn list_tenants(&self) -> Result<Vec<Tenant>> {
        Ok(self.lock().tenants.values().cloned().collect())
    }

    fn create_join_token(
        &self,
        tenant_id: &str,
        ttl_minutes: i64,
        one_time: bool,
    ) -> Result<JoinToken> {
        let ttl = if ttl_minutes <= 0 {
            DEFAULT_TOKEN_TTL_MINUTES
        } else {
            ttl_minutes
        };
        let now = Utc::now();
        let jt = JoinToken {
            id: random_hex(16),
            token: random_hex(24),
            tenant_id: tenant_id.to_string(),
            expires_at: now + Duration::minutes(ttl),
            one_time,
            created_at: now,
        };

        let mut inner = self.lock();
        if !inner.tenants.contains_key(tenant_id) {
            return Err(Error::TenantNotFound);
        }
        inner.tokens.insert(jt.token.clone(), jt.clone());
        Ok(jt)
    }

    fn create_join_token_with_secret(&self, mut token: JoinToken) -> Result<JoinToken> {
        if token.token.is_empty() {
            return Err(Error::Config("token secret required".to_string()));
        }
        if token.id.is_empty() {
            token.id = random_hex(16);
        }
        let mut inner = self.lock();
        if !inner.tenants.contains_key(&token.tenant_id) {
            return Err(Error::TenantNotFound);
        }
        inner.tokens.insert(token.token.clone(), token.clone());
        Ok(token)
    }

    fn validate_join_token(&self, token: &str) -> Result<JoinToken> {
        // Lookup, expiry check, and conditional removal form one critical
        // section: two concurrent callers must never both consume a
        // one-time token.
        let mut inner = self.lock();
        let jt = inner.tokens.get(token).ok_or(Error::TokenUnknown)?.clone();
        if Utc::now() > jt.expires_at {
            inner.tokens.remove(token);
            return Err(Error::TokenExpired {
                token_id: jt.id,
                tenant_id: jt.tenant_id,
            });
        }
        if jt.one_time {
            inner.tokens.remove(token);
        }
        Ok(jt)
    }

    fn list_join_tokens(&self, tenant_id: &str) -> Result<Vec<JoinToken>> {
        let inner = self.lock();
        let mut tokens: Vec<JoinToken> = inner
            .tokens
            .values()
            .filter(|jt| jt.tenant_id == tenant_id)
            .cloned()
            .collect();
        tokens.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tokens)
    }

    fn revoke_join_token(&self, id: &str) -> Result<bool> {
        let mut inner = self.lock();
        let key = inner
            .tokens
            .values()
            .find(|jt| jt.id == id)
            .map(|jt| jt.token.clone());
        match key {
            Some(key) => {
                inner.tokens.remove(&key);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn register_agent(&self, agent: Agent) -> Result<()> {
        self.lock().agents.insert(agent.agent_id.clone(), agent);
        Ok(())
    }

    fn get_agent(&self, agent_id: &str) -> Result<Option<Agent>> {
        Ok(self.lock().agents.get(agent_id).cloned())
    }

    fn create_pending_registration(&self, mut reg: PendingAgentRegistration) -> Result<i64> {
        let mut inner = self.lock();
        let id = inner.next_pending_id;
        inner.next_pending_id += 1;
        reg.id = id;
        reg.status = PendingStatus::Pending;
        reg.created_at = Utc::now();
        inner.pending.insert(id, reg);
        Ok(id)
    }

    fn get_pending_registration(&self, id: i64) -> Result<Option<PendingAgentRegistration>> {
        Ok(self.lock().pending.get(&id).cloned())
    }

    fn list_pending_registrations(
        &self,
        status: Option<PendingStatus>,
    ) -> Result<Vec<PendingAgentRegistration>> {
        let inner = self.lock();
        let mut list: Vec<PendingAgentRegistration> = inner
            .pending
            .values()
            .filter(|reg| status.is_none_or(|s| reg.status == s))
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    fn approve_pending_registration(
        &self,
        id: i64,
        _tenant_id: &str,
        reviewed_by: &str,
    ) -> Result<()> {
        let mut inner = self.lock();
        let reg = inner.pending.get_mut(&id).ok_or(Error::NotFound)?;
        if reg.status != PendingStatus::Pending {
            return Err(Error::AlreadyResolved);
        }
        reg.status = PendingStatus::Approved;
        reg.reviewed_at = Some(Utc::now());
        reg.reviewed_by = reviewed_by.to_string();
        Ok(())
    }

    fn reject_pending_registration(&self, id: i64, reviewed_by: &str, notes: &str) -> Result<()> {
        let mut inner = self.lock();
        let reg = inner.pending.get_mut(&id).ok_or(Error::NotFound)?;
        if reg.status != PendingStatus::Pending {
            return Err(Error::AlreadyResolved);
        }
        reg.status = PendingStatus::Rejected;
        reg.reviewed_at = Some(Utc::now());
        reg.reviewed_by = reviewed_by.to_string();
        reg.notes = notes.to_string();
        Ok(())
    }

    fn delete_pending_registration(&self, id: i64) -> Result<bool> {
        Ok(self.lock().pending.remove(&id).is_some())
    }

    fn get_update_policy(&self, tenant_id: &str) -> Result<Option<FleetUpdatePolicy>> {
        Ok(self.lock().policies.get(tenant_id).cloned())
    }

    fn upsert_update_policy(&self, tenant_id: &str, spec: PolicySpec) -> Result<FleetUpdatePolicy> {
        let record = FleetUpdatePolicy {
            tenant_id: tenant_id.to_string(),
            spec,
            updated_at: Utc::now(),
        };
        self.lock()
            .policies
            .insert(tenant_id.to_string(), record.clone());
        Ok(record)
    }

    fn delete_update_policy(&self, tenant_id: &str) -> Result<()> {
        self.lock().policies.remove(tenant_id);
        Ok(())
    }

    fn list_update_policies(&self) -> Result<Vec<FleetUpdatePolicy>> {
        Ok(self.lock().policies.values().cloned().collect())
    }
}

fn ensure_unique_domain(
    tenants: &HashMap<String, Tenant>,
    id: &str,
    domain: &str,
) -> Result<()> {
    if domain.is_empty() {
        return Ok(());
    }
    for (existing_id, existing) in tenants {
        if existing_id == id || existing.login_domain.is_empty() {
            continue;
        }
        if existing.login_domain == domain {
            return Err(Error::DomainConflict);
        }
    }
    Ok(())
}
