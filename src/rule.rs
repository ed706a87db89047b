//! CompiledRule - handle returned by `build`
//!
//! A rule owns the expression text, the compiled definition (when compiling
//! succeeded) and the warnings collected while compiling. Compile errors
//! never escape `build`; callers check [`CompiledRule::success`] instead.

use std::sync::Arc;

use crate::condition::{cache, evaluate, parser, Candidate, Definition};
use crate::error::Result;

/// Compiled expression and its compile status
///
/// Cloning is cheap: the definition is shared, so clones can be handed to
/// other threads and tested concurrently.
#[derive(Debug, Clone, Default)]
pub struct CompiledRule {
    expression: String,
    definition: Option<Arc<Definition>>,
    warnings: Vec<String>,
}

impl CompiledRule {
    /// Compile an expression
    pub fn build(expression: &str) -> Self {
        Self::from_result(expression, parser::parse(expression).map(Arc::new))
    }

    /// Compile an expression through the global definition cache
    pub fn cached(expression: &str) -> Self {
        Self::from_result(expression, cache::get_or_parse(expression))
    }

    /// Wrap an already built definition, e.g. a literal loaded from JSON
    pub fn from_definition(definition: Definition) -> Self {
        Self {
            expression: definition.to_string(),
            definition: Some(Arc::new(definition)),
            warnings: Vec::new(),
        }
    }

    fn from_result(expression: &str, result: Result<Arc<Definition>>) -> Self {
        match result {
            Ok(definition) => {
                tracing::debug!(expression, nodes = definition.node_count(), "compiled rule");
                Self {
                    expression: expression.to_string(),
                    definition: Some(definition),
                    warnings: Vec::new(),
                }
            }
            Err(err) => {
                tracing::debug!(expression, error = %err, "rule failed to compile");
                Self {
                    expression: expression.to_string(),
                    definition: None,
                    warnings: vec![err.to_string()],
                }
            }
        }
    }

    /// Re-compile in place with a new expression
    pub fn update(&mut self, expression: &str) -> &mut Self {
        *self = Self::build(expression);
        self
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Compiled tree, `None` when compiling failed
    pub fn definition(&self) -> Option<&Definition> {
        self.definition.as_deref()
    }

    /// Shared handle to the compiled tree
    pub fn shared_definition(&self) -> Option<Arc<Definition>> {
        self.definition.clone()
    }

    #[inline]
    pub fn success(&self) -> bool {
        self.definition.is_some()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Test a candidate against the compiled definition
    ///
    /// A rule that failed to compile matches nothing.
    pub fn test<C: Candidate + ?Sized>(&self, candidate: &C) -> bool {
        match &self.definition {
            Some(definition) => evaluate(definition, candidate),
            None => {
                tracing::warn!(
                    expression = %self.expression,
                    "testing a rule that failed to compile"
                );
                false
            }
        }
    }
}

/// Compile an expression into a rule
pub fn build(expression: &str) -> CompiledRule {
    CompiledRule::build(expression)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_build_success_and_warnings() {
        let rule = build("project && (id || (name && year))");
        assert!(rule.success());
        assert!(rule.warnings().is_empty());
        assert!(rule.definition().is_some());
        assert_eq!(rule.expression(), "project && (id || (name && year))");
    }

    #[test]
    fn test_simple_rule_end_to_end() {
        let rule = build("project && (id || (name && year))");
        let testables = [
            (json!({ "project": "ABC", "id": 123 }), true),
            (json!({ "project": "ABC", "idx": 123 }), false),
            (json!({ "project": "ABC", "name": "Joe", "year": 1923 }), true),
            (json!({ "id": 123 }), false),
        ];

        for (candidate, expected) in testables {
            assert_eq!(rule.test(&candidate), expected, "Candidate: {}", candidate);
        }
    }

    #[test]
    fn test_definition_shape() {
        let rule = build("project && (id || (name && year))");
        let def = rule.definition().unwrap();

        match def {
            Definition::And(children) => {
                assert_eq!(children[0], Definition::Identifier("project".to_string()));
                match &children[1] {
                    Definition::Or(inner) => {
                        assert_eq!(inner[0], Definition::Identifier("id".to_string()));
                    }
                    other => panic!("Expected OR node, got {:?}", other),
                }
            }
            other => panic!("Expected AND node, got {:?}", other),
        }
    }

    #[test]
    fn test_token_count() {
        assert!(build("one").success());
        assert!(build("one && two").success());
        assert!(!build("one && two three").success());
    }

    #[test]
    fn test_mixed_operators() {
        assert!(build("one && two && three").success());
        assert!(build("one || two || four").success());

        let rule = build("one && two || four");
        assert!(!rule.success());
        assert!(rule.definition().is_none());
        assert_eq!(rule.warnings().len(), 1);
        assert!(rule.warnings()[0].contains("must be the same"));
    }

    #[test]
    fn test_extra_parentheses() {
        let all = json!({ "one": 1, "two": 2, "three": 3 });

        assert!(build("(one)").success());
        assert!(build("((one))").success());
        assert!(build("one && (three && two)").test(&all));
        assert!(build("one && (((three && two)))").test(&all));
        assert!(build("((three && two))").test(&all));
    }

    #[test]
    fn test_redundant_nesting_behaves_identically() {
        let rules = [build("x"), build("(x)"), build("((x))")];
        for candidate in [json!({ "x": 1 }), json!({ "y": 1 }), json!({})] {
            let results: Vec<bool> = rules.iter().map(|r| r.test(&candidate)).collect();
            assert!(results.windows(2).all(|w| w[0] == w[1]));
        }
    }

    #[test]
    fn test_failed_rule_matches_nothing() {
        let rule = build("a) && (b");
        assert!(!rule.success());
        assert!(!rule.test(&json!({ "a": 1, "b": 2 })));
    }

    #[test]
    fn test_update_recompiles_in_place() {
        let mut rule = build("a && b ||");
        assert!(!rule.success());

        rule.update("a || b");
        assert!(rule.success());
        assert!(rule.warnings().is_empty());
        assert_eq!(rule.expression(), "a || b");
        assert!(rule.test(&json!({ "b": true })));

        assert!(!rule.update("a b").success());
    }

    #[test]
    fn test_from_definition() {
        let def = Definition::from_json(r#"{"$or": ["id", {"$and": ["name", "year"]}]}"#).unwrap();
        let rule = CompiledRule::from_definition(def);

        assert!(rule.success());
        assert_eq!(rule.expression(), "id || (name && year)");

        let mut candidate = HashMap::new();
        candidate.insert("name".to_string(), ());
        assert!(!rule.test(&candidate));
        candidate.insert("year".to_string(), ());
        assert!(rule.test(&candidate));
    }

    #[test]
    fn test_compiling_twice_is_equal() {
        let expr = "project && (id || (name && year))";
        assert_eq!(build(expr).definition(), build(expr).definition());
    }

    #[test]
    fn test_cached_rule_shares_tree() {
        let expr = "rule_cached_a && rule_cached_b";
        let first = CompiledRule::cached(expr);
        let second = CompiledRule::cached(expr);
        assert!(Arc::ptr_eq(
            &first.shared_definition().unwrap(),
            &second.shared_definition().unwrap()
        ));
    }

    #[test]
    fn test_rule_is_shareable_across_threads() {
        let rule = build("a || b");
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let rule = rule.clone();
                std::thread::spawn(move || {
                    let key = if i % 2 == 0 { "a" } else { "c" };
                    let mut candidate = HashMap::new();
                    candidate.insert(key.to_string(), i);
                    rule.test(&candidate)
                })
            })
            .collect();

        let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results, vec![true, false, true, false]);
    }
}
