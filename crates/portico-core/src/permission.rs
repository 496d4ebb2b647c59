//! Permission levels and grant resolution
//!
//! A caller's authorization state is a set of [`PermissionRecord`]s, one per
//! named resource. Views resolve the record for the resource they operate on
//! (given explicitly as a [`ResourceContext`]) into a single
//! [`PermissionLevel`] and gate rendering with its predicates.
//!
//! Levels are ordered: `None < Read < Write < Access`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{PorticoError, Result};

// ============================================================================
// Permission Levels
// ============================================================================

/// Ordered capability tier for a named resource.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionLevel {
    /// No grant for the resource
    #[default]
    None,
    /// May view the resource
    Read,
    /// May view and modify the resource
    Write,
    /// Full access, including privileged actions
    Access,
}

impl PermissionLevel {
    /// All levels in ascending order
    pub const ALL: [PermissionLevel; 4] = [Self::None, Self::Read, Self::Write, Self::Access];

    /// True for `Read`, `Write`, and `Access`.
    #[inline]
    pub fn can_read(&self) -> bool {
        *self >= Self::Read
    }

    /// True for `Write` and `Access`.
    #[inline]
    pub fn can_write(&self) -> bool {
        *self >= Self::Write
    }

    /// True only for `Access`.
    #[inline]
    pub fn can_access(&self) -> bool {
        *self >= Self::Access
    }

    /// Whether this level meets `required`
    #[inline]
    pub fn satisfies(&self, required: PermissionLevel) -> bool {
        *self >= required
    }

    /// Wire name (`NONE`, `READ`, `WRITE`, `ACCESS`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Read => "READ",
            Self::Write => "WRITE",
            Self::Access => "ACCESS",
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionLevel {
    type Err = PorticoError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| PorticoError::validation(format!("Unknown permission level: {s}")))
    }
}

// ============================================================================
// Records and Contexts
// ============================================================================

/// A granted level for one named resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionRecord {
    /// Resource the grant applies to (exact, case-sensitive)
    pub resource_name: String,
    /// Granted level
    pub level: PermissionLevel,
}

impl PermissionRecord {
    /// Create a record
    pub fn new(resource_name: impl Into<String>, level: PermissionLevel) -> Self {
        Self {
            resource_name: resource_name.into(),
            level,
        }
    }
}

/// The resource a UI subtree is currently operating on.
///
/// Contexts are immutable. A nested subtree that works on a different
/// resource builds its own context rather than mutating its parent's.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceContext {
    resource: String,
}

impl ResourceContext {
    /// Context for the named resource
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
        }
    }

    /// Resource name
    pub fn resource(&self) -> &str {
        &self.resource
    }
}

impl fmt::Display for ResourceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.resource)
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the caller's level for `resource_id`.
///
/// Matching is exact and case-sensitive. If no record matches, the level is
/// `None`. A valid grant set never holds two records for the same resource;
/// if one does anyway, the first record in slice order wins.
pub fn resolve(resource_id: &str, granted: &[PermissionRecord]) -> PermissionLevel {
    granted
        .iter()
        .find(|record| record.resource_name == resource_id)
        .map(|record| record.level)
        .unwrap_or_default()
}

/// A caller's grants, unique by resource name.
///
/// Built with [`GrantSet::from_records`], which keeps the first record for
/// each resource in insertion order and drops later duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<PermissionRecord>", into = "Vec<PermissionRecord>")]
pub struct GrantSet {
    records: Vec<PermissionRecord>,
}

impl GrantSet {
    /// Empty grant set; every resource resolves to `None`
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a grant set, keeping the first record per resource.
    pub fn from_records(records: impl IntoIterator<Item = PermissionRecord>) -> Self {
        let mut unique: Vec<PermissionRecord> = Vec::new();
        for record in records {
            if let Some(kept) = unique
                .iter()
                .find(|kept| kept.resource_name == record.resource_name)
            {
                tracing::warn!(
                    resource = %record.resource_name,
                    kept = %kept.level,
                    dropped = %record.level,
                    "Duplicate permission record ignored"
                );
                continue;
            }
            unique.push(record);
        }
        Self { records: unique }
    }

    /// Level granted for a resource name
    pub fn resolve(&self, resource_id: &str) -> PermissionLevel {
        resolve(resource_id, &self.records)
    }

    /// Level granted for the resource of `context`
    pub fn level(&self, context: &ResourceContext) -> PermissionLevel {
        self.resolve(context.resource())
    }

    /// Fail with `Forbidden` unless the caller holds at least `required` on `context`.
    pub fn require(&self, context: &ResourceContext, required: PermissionLevel) -> Result<()> {
        let granted = self.level(context);
        if granted.satisfies(required) {
            Ok(())
        } else {
            Err(PorticoError::forbidden(format!(
                "{required} on {context} required, caller holds {granted}"
            )))
        }
    }

    /// Records in insertion order
    pub fn records(&self) -> &[PermissionRecord] {
        &self.records
    }

    /// Number of resources with a grant
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the set holds no grants
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<PermissionRecord>> for GrantSet {
    fn from(records: Vec<PermissionRecord>) -> Self {
        Self::from_records(records)
    }
}

impl From<GrantSet> for Vec<PermissionRecord> {
    fn from(grants: GrantSet) -> Self {
        grants.records
    }
}

impl FromIterator<PermissionRecord> for GrantSet {
    fn from_iter<I: IntoIterator<Item = PermissionRecord>>(iter: I) -> Self {
        Self::from_records(iter)
    }
}
