//! Fleet update rollout policy: specification types, normalization, and
//! validation. Policies are keyed by tenant ID or the reserved `global`
//! alias, which maps to a storage sentinel so the fleet-wide default can
//! live in the same table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display alias accepted on the wire for the fleet-wide default policy.
pub const GLOBAL_POLICY_ALIAS: &str = "global";

/// Storage sentinel key backing the `global` alias.
pub const GLOBAL_POLICY_TENANT_ID: &str = "__global_auto_update__";

/// Granularity of version pinning when calculating acceptable update
/// targets. Unrecognized strings normalize to `Minor` on every decode path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum VersionPinStrategy {
    Major,
    #[default]
    Minor,
    Patch,
}

impl From<String> for VersionPinStrategy {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "major" => VersionPinStrategy::Major,
            "patch" => VersionPinStrategy::Patch,
            _ => VersionPinStrategy::Minor,
        }
    }
}

/// When updates may be applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaintenanceWindow {
    pub enabled: bool,
    pub start_hour: i32,
    pub start_min: i32,
    pub end_hour: i32,
    pub end_min: i32,
    pub timezone: String,
    pub days_of_week: Vec<i32>,
}

/// How updates are staged across the fleet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RolloutControl {
    pub staggered: bool,
    pub max_concurrent: i32,
    pub batch_size: i32,
    pub delay_between_waves: i32,
    pub jitter_seconds: i32,
    pub emergency_abort: bool,
}

/// The knobs governing when and how software updates reach a tenant's
/// agents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicySpec {
    pub update_check_days: i32,
    pub version_pin_strategy: VersionPinStrategy,
    pub allow_major_upgrade: bool,
    pub target_version: String,
    pub maintenance_window: MaintenanceWindow,
    pub rollout_control: RolloutControl,
    pub collect_telemetry: bool,
}

/// A stored rollout policy record. One per tenant-or-global key.
#[derive(Debug, Clone, Serialize)]
pub struct FleetUpdatePolicy {
    pub tenant_id: String,
    pub spec: PolicySpec,
    pub updated_at: DateTime<Utc>,
}

/// Resolves a wire tenant reference to its storage key. Returns the storage
/// key and whether it refers to the fleet-wide default. Empty input yields
/// `None`.
#[must_use]
pub fn resolve_tenant_ref(value: &str) -> Option<(String, bool)> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.eq_ignore_ascii_case(GLOBAL_POLICY_ALIAS) || trimmed == GLOBAL_POLICY_TENANT_ID {
        return Some((GLOBAL_POLICY_TENANT_ID.to_string(), true));
    }
    Some((trimmed.to_string(), false))
}

/// Maps a storage key back to its display reference.
#[must_use]
pub fn display_tenant_ref(tenant_id: &str) -> &str {
    if tenant_id == GLOBAL_POLICY_TENANT_ID {
        GLOBAL_POLICY_ALIAS
    } else {
        tenant_id
    }
}

/// Applies the write-path normalization rules: trim the target version and
/// timezone, deduplicate and sort days of week. Pin-strategy normalization
/// is handled by the type itself during decode.
#[must_use]
pub fn normalize_spec(spec: PolicySpec) -> PolicySpec {
    let mut normalized = spec;
    normalized.target_version = normalized.target_version.trim().to_string();
    normalized.maintenance_window.timezone =
        normalized.maintenance_window.timezone.trim().to_string();
    let days = &mut normalized.maintenance_window.days_of_week;
    days.sort_unstable();
    days.dedup();
    normalized
}

/// Validates a normalized spec, collecting every violated rule rather than
/// stopping at the first.
#[must_use]
pub fn validate_spec(spec: &PolicySpec) -> Vec<String> {
    let mut issues = Vec::new();
    if spec.update_check_days < 0 {
        issues.push("update_check_days must be >= 0".to_string());
    }
    let mw = &spec.maintenance_window;
    if mw.enabled {
        if mw.timezone.is_empty() {
            issues.push("maintenance_window.timezone is required when enabled".to_string());
        }
        if !(0..=23).contains(&mw.start_hour) {
            issues.push("maintenance_window.start_hour must be between 0 and 23".to_string());
        }
        if !(0..=59).contains(&mw.start_min) {
            issues.push("maintenance_window.start_min must be between 0 and 59".to_string());
        }
        if !(0..=23).contains(&mw.end_hour) {
            issues.push("maintenance_window.end_hour must be between 0 and 23".to_string());
        }
        if !(0..=59).contains(&mw.end_min) {
            issues.push("maintenance_window.end_min must be between 0 and 59".to_string());
        }
        if mw.days_of_week.is_empty() {
            issues.push("maintenance_window.days_of_week must include at least one day".to_string());
        }
        if mw.days_of_week.iter().any(|day| !(0..=6).contains(day)) {
            issues.push("maintenance_window.days_of_week must be between 0 and 6".to_string());
        }
    }
    let rc = &spec.rollout_control;
    if rc.max_concurrent < 0 {
        issues.push("rollout_control.max_concurrent must be >= 0".to_string());
    }
    if rc.batch_size < 0 {
        issues.push("rollout_control.batch_size must be >= 0".to_string());
    }
    if rc.delay_between_waves < 0 {
        issues.push("rollout_control.delay_between_waves must be >= 0".to_string());
    }
    if rc.jitter_seconds < 0 {
        issues.push("rollout_control.jitter_seconds must be >= 0".to_string());
    }
    issues
}
