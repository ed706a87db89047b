//! Rule set configuration
//!
//! Named rules are loaded from JSON of the form
//! `{"rules": {"name": "a && (b || c)", "other": {"$or": ["x", "y"]}}}`.
//! A rule is either an expression string or a literal definition object.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::condition::{Candidate, Definition};
use crate::error::Result;
use crate::rule::CompiledRule;

/// Source of one named rule
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RuleSource {
    /// Expression text, compiled on load
    Expression(String),
    /// Literal definition object
    Literal(Definition),
}

/// Deserialized rule set configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RuleSetConfig {
    #[serde(default)]
    pub rules: BTreeMap<String, RuleSource>,
}

impl RuleSetConfig {
    /// Parse a rule set configuration from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Compiled rules keyed by name
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: BTreeMap<String, CompiledRule>,
}

impl RuleSet {
    /// Compile every rule in the configuration
    ///
    /// Rules that fail to compile are kept, with their warnings, so that
    /// callers can report them through [`RuleSet::failures`].
    pub fn from_config(config: RuleSetConfig) -> Self {
        let rules = config
            .rules
            .into_iter()
            .map(|(name, source)| {
                let rule = match source {
                    RuleSource::Expression(expression) => CompiledRule::build(&expression),
                    RuleSource::Literal(definition) => CompiledRule::from_definition(definition),
                };
                if !rule.success() {
                    tracing::warn!(
                        rule = %name,
                        expression = %rule.expression(),
                        warnings = ?rule.warnings(),
                        "rule failed to compile"
                    );
                }
                (name, rule)
            })
            .collect();

        Self { rules }
    }

    /// Load and compile a rule set from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::from_config(RuleSetConfig::from_json(json)?))
    }

    pub fn get(&self, name: &str) -> Option<&CompiledRule> {
        self.rules.get(name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules that failed to compile, with their warnings
    pub fn failures(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.rules
            .iter()
            .filter(|(_, rule)| !rule.success())
            .map(|(name, rule)| (name.as_str(), rule.warnings()))
    }

    /// Names of compiled rules the candidate satisfies, in name order
    pub fn matching<C: Candidate + ?Sized>(&self, candidate: &C) -> Vec<&str> {
        self.rules
            .iter()
            .filter(|(_, rule)| rule.success() && rule.test(candidate))
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
