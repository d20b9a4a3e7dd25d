//! fabric-policy: stateless rule checks gating every fabric read and write.
//!
//! The evaluator is seeded with a policy table (see
//! `fabric_core::policy::default_policies`) and answers link, node-access,
//! and query checks with `PolicyEvaluation` records.

pub mod evaluator;

pub use evaluator::{all_passed, PolicyEvaluator};
