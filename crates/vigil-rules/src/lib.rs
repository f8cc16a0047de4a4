//! Deterministic pattern-rule scanner producing structured security
//! findings from raw diff text.
//!
//! Two tiers share one [`RuleEngine`]: a fast tier of secret / SQL-injection
//! / XSS shapes and a deep tier grouped into ten vulnerability-taxonomy
//! categories. Rules are declarative data ([`tables`]) compiled once at
//! startup; scans are linear per rule, false-positive-tolerant by design,
//! and complement rather than replace the semantic specialists.

mod engine;
pub mod tables;

pub use engine::{RuleEngine, DEEP_PRODUCER, FAST_PRODUCER};
