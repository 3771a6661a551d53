// =============================================================================
// Signals Module
// =============================================================================
//
// Rule-based scoring of a feature vector into a BUY / SELL / NEUTRAL bias.

pub mod classifier;

pub use classifier::{ClassifierScore, RuleContribution, SignalClassifier};
