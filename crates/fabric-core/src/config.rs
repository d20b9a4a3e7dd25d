//! Configuration management for the data fabric.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (`FABRIC__<SECTION>__<KEY>`, e.g.
//!    `FABRIC__QUERY__KNOWLEDGE_DEPTH`)
//! 2. Config file (`fabric.toml` by default)
//! 3. Defaults

use serde::Deserialize;

use crate::error::{FabricError, Result};
use crate::policy::{default_policies, Policy};

/// Top-level fabric configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FabricConfig {
    /// Traversal defaults for the query resolver.
    #[serde(default)]
    pub query: QueryConfig,

    /// Automatic link inference at registration time.
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Audit emission.
    #[serde(default)]
    pub audit: AuditConfig,

    /// Policy table the evaluator is seeded with.
    #[serde(default = "default_policies")]
    pub policies: Vec<Policy>,
}

/// Depth limits and result caps applied when a query leaves them unset.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct QueryConfig {
    #[serde(default = "default_knowledge_depth")]
    pub knowledge_depth: usize,

    #[serde(default = "default_lineage_depth")]
    pub lineage_depth: usize,

    #[serde(default = "default_impact_depth")]
    pub impact_depth: usize,

    /// Result cap used when a query does not supply one. `None` means uncapped.
    #[serde(default)]
    pub default_max_results: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct InferenceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Creator identity stamped on inferred edges.
    #[serde(default = "default_inference_actor")]
    pub actor: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AuditConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_knowledge_depth() -> usize {
    2
}

fn default_lineage_depth() -> usize {
    5
}

fn default_impact_depth() -> usize {
    3
}

fn default_true() -> bool {
    true
}

fn default_inference_actor() -> String {
    "system:inference".to_string()
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            knowledge_depth: default_knowledge_depth(),
            lineage_depth: default_lineage_depth(),
            impact_depth: default_impact_depth(),
            default_max_results: None,
        }
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            actor: default_inference_actor(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for FabricConfig {
    fn default() -> Self {
        Self {
            query: QueryConfig::default(),
            inference: InferenceConfig::default(),
            audit: AuditConfig::default(),
            policies: default_policies(),
        }
    }
}

impl FabricConfig {
    /// Load configuration from `<file_prefix>.{toml,json,yaml}` (optional) and
    /// `FABRIC__*` environment variables.
    pub fn load(file_prefix: &str) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("FABRIC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| FabricError::Config(e.to_string()))?;

        let loaded: FabricConfig = cfg
            .try_deserialize()
            .map_err(|e| FabricError::Config(e.to_string()))?;

        tracing::debug!(
            policies = loaded.policies.len(),
            inference = loaded.inference.enabled,
            "Fabric configuration loaded"
        );
        Ok(loaded)
    }
}
