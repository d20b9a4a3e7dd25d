//! Ordered rule table for automatic link inference.
//!
//! Rules are directional: `(from, to)` only matches when the newly registered
//! node has type `from` and the candidate has type `to`. The first matching
//! rule wins, so table order is part of the behavior.

use fabric_core::{EdgeType, EntityType};

/// One `(from-type, to-type) -> (edge-type, strength, rationale)` rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferenceRule {
    pub from: EntityType,
    pub to: EntityType,
    pub edge_type: EdgeType,
    pub strength: f64,
    pub rationale: &'static str,
}

impl InferenceRule {
    const fn new(
        from: EntityType,
        to: EntityType,
        edge_type: EdgeType,
        strength: f64,
        rationale: &'static str,
    ) -> Self {
        Self {
            from,
            to,
            edge_type,
            strength,
            rationale,
        }
    }

    pub fn matches(&self, from: EntityType, to: EntityType) -> bool {
        self.from == from && self.to == to
    }
}

pub const INFERENCE_RULES: [InferenceRule; 6] = [
    InferenceRule::new(
        EntityType::TrainingModule,
        EntityType::KnowledgePack,
        EdgeType::References,
        0.8,
        "Training module references knowledge pack content",
    ),
    InferenceRule::new(
        EntityType::Insight,
        EntityType::Metric,
        EdgeType::DerivedFrom,
        0.9,
        "Insight derived from metric data",
    ),
    InferenceRule::new(
        EntityType::Report,
        EntityType::Metric,
        EdgeType::IsSourcedFrom,
        0.85,
        "Report sourced from metric data",
    ),
    InferenceRule::new(
        EntityType::Alert,
        EntityType::Incident,
        EdgeType::Triggers,
        0.75,
        "Alert triggers incident response",
    ),
    InferenceRule::new(
        EntityType::Incident,
        EntityType::Asset,
        EdgeType::Affects,
        0.7,
        "Incident affects asset",
    ),
    InferenceRule::new(
        EntityType::Certification,
        EntityType::TrainingModule,
        EdgeType::Validates,
        0.85,
        "Certification validates training module completion",
    ),
];

/// First rule in `rules` matching `(from, to)`.
pub fn match_rule(rules: &[InferenceRule], from: EntityType, to: EntityType) -> Option<&InferenceRule> {
    rules.iter().find(|r| r.matches(from, to))
}
