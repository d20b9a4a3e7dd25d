//! Scope contexts: the tenant/facility/room isolation boundary attached to
//! every node and edge.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Hierarchical visibility tier. Engine and asset-type scopes sit at the
/// same depth, below room.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ScopeTier {
    Global,
    Tenant,
    Facility,
    Room,
    Engine,
    AssetType,
}

impl ScopeTier {
    /// Restrictiveness rank: higher is narrower.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Global => 0,
            Self::Tenant => 1,
            Self::Facility => 2,
            Self::Room => 3,
            Self::Engine | Self::AssetType => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Tenant => "tenant",
            Self::Facility => "facility",
            Self::Room => "room",
            Self::Engine => "engine",
            Self::AssetType => "asset-type",
        }
    }
}

impl fmt::Display for ScopeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visibility tag derived one-to-one from a scope tier.
///
/// Ordered from least to most restrictive so `max` picks the stricter tag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Tenant,
    Facility,
    Restricted,
}

/// Visibility boundary for a node, edge, or requester.
///
/// The tenant identifier is mandatory at every tier, including global.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScopeContext {
    pub tier: ScopeTier,
    pub tenant_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<String>,
}

impl ScopeContext {
    fn bare(tier: ScopeTier, tenant_id: &str) -> Self {
        Self {
            tier,
            tenant_id: tenant_id.to_string(),
            facility_id: None,
            room_id: None,
            engine_id: None,
            asset_type: None,
        }
    }

    pub fn global(tenant_id: &str) -> Self {
        Self::bare(ScopeTier::Global, tenant_id)
    }

    pub fn tenant(tenant_id: &str) -> Self {
        Self::bare(ScopeTier::Tenant, tenant_id)
    }

    pub fn facility(tenant_id: &str, facility_id: &str) -> Self {
        Self {
            facility_id: Some(facility_id.to_string()),
            ..Self::bare(ScopeTier::Facility, tenant_id)
        }
    }

    pub fn room(tenant_id: &str, facility_id: &str, room_id: &str) -> Self {
        Self {
            facility_id: Some(facility_id.to_string()),
            room_id: Some(room_id.to_string()),
            ..Self::bare(ScopeTier::Room, tenant_id)
        }
    }

    pub fn engine(tenant_id: &str, engine_id: &str) -> Self {
        Self {
            engine_id: Some(engine_id.to_string()),
            ..Self::bare(ScopeTier::Engine, tenant_id)
        }
    }

    pub fn asset_type(tenant_id: &str, asset_type: &str) -> Self {
        Self {
            asset_type: Some(asset_type.to_string()),
            ..Self::bare(ScopeTier::AssetType, tenant_id)
        }
    }

    /// Merge two scopes into the more restrictive one.
    ///
    /// The tier with the higher rank wins (ties keep `self`'s tier). The
    /// tenant always comes from `self`; narrower identifiers are taken from
    /// `self` first, then from `other`.
    pub fn merge(&self, other: &ScopeContext) -> ScopeContext {
        let tier = if other.tier.rank() > self.tier.rank() {
            other.tier
        } else {
            self.tier
        };

        ScopeContext {
            tier,
            tenant_id: self.tenant_id.clone(),
            facility_id: self.facility_id.clone().or_else(|| other.facility_id.clone()),
            room_id: self.room_id.clone().or_else(|| other.room_id.clone()),
            engine_id: self.engine_id.clone().or_else(|| other.engine_id.clone()),
            asset_type: self.asset_type.clone().or_else(|| other.asset_type.clone()),
        }
    }

    pub fn visibility(&self) -> Visibility {
        match self.tier {
            ScopeTier::Global => Visibility::Public,
            ScopeTier::Tenant => Visibility::Tenant,
            ScopeTier::Facility => Visibility::Facility,
            ScopeTier::Room | ScopeTier::Engine | ScopeTier::AssetType => Visibility::Restricted,
        }
    }

    /// Whether entities at this scope may be shared across tenants.
    pub fn federation_eligible(&self) -> bool {
        matches!(self.tier, ScopeTier::Global | ScopeTier::Tenant)
    }
}
