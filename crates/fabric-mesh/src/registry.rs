//! Per-(tenant, facility) fabric instances.

use std::collections::HashMap;

use fabric_audit::AuditSink;
use fabric_core::{FabricConfig, ScopeContext};
use serde::{Deserialize, Serialize};

use crate::fabric::DataFabric;

/// Identifies one fabric instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FabricKey {
    pub tenant_id: String,
    #[serde(default)]
    pub facility_id: Option<String>,
}

impl FabricKey {
    /// Tenant-wide fabric key.
    pub fn tenant(tenant_id: &str) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            facility_id: None,
        }
    }

    pub fn facility(tenant_id: &str, facility_id: &str) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            facility_id: Some(facility_id.to_string()),
        }
    }

    /// Tenant-wide key for the tenant named in `scope`.
    pub fn for_scope(scope: &ScopeContext) -> Self {
        Self::tenant(&scope.tenant_id)
    }
}

type SinkFactory = Box<dyn Fn() -> Box<dyn AuditSink> + Send>;

/// Owns one `DataFabric` per key, created lazily on first use.
///
/// Instances with different keys share no state. Tearing a fabric down
/// drops its graph and audit trail.
pub struct FabricRegistry {
    config: FabricConfig,
    fabrics: HashMap<FabricKey, DataFabric>,
    sink_factory: Option<SinkFactory>,
}

impl Default for FabricRegistry {
    fn default() -> Self {
        Self::new(FabricConfig::default())
    }
}

impl FabricRegistry {
    pub fn new(config: FabricConfig) -> Self {
        Self {
            config,
            fabrics: HashMap::new(),
            sink_factory: None,
        }
    }

    /// Build each new fabric's audit sink with `factory` instead of the
    /// in-memory default.
    pub fn with_sink_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn AuditSink> + Send + 'static,
    {
        self.sink_factory = Some(Box::new(factory));
        self
    }

    /// Return the fabric for `key`, creating it on first use.
    pub fn get_or_create(&mut self, key: &FabricKey) -> &mut DataFabric {
        let config = &self.config;
        let factory = &self.sink_factory;
        self.fabrics.entry(key.clone()).or_insert_with(|| {
            tracing::info!(
                tenant_id = %key.tenant_id,
                facility_id = ?key.facility_id,
                "Creating fabric instance"
            );
            let fabric = DataFabric::new(config.clone());
            match factory {
                Some(make) => fabric.with_audit_sink(make()),
                None => fabric,
            }
        })
    }

    pub fn get(&self, key: &FabricKey) -> Option<&DataFabric> {
        self.fabrics.get(key)
    }

    pub fn get_mut(&mut self, key: &FabricKey) -> Option<&mut DataFabric> {
        self.fabrics.get_mut(key)
    }

    /// Remove and return the fabric for `key`.
    pub fn teardown(&mut self, key: &FabricKey) -> Option<DataFabric> {
        let removed = self.fabrics.remove(key);
        if removed.is_some() {
            tracing::info!(
                tenant_id = %key.tenant_id,
                facility_id = ?key.facility_id,
                "Fabric instance torn down"
            );
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.fabrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fabrics.is_empty()
    }

    /// Keys of all live fabrics, sorted.
    pub fn keys(&self) -> Vec<&FabricKey> {
        let mut keys: Vec<_> = self.fabrics.keys().collect();
        keys.sort();
        keys
    }
}
