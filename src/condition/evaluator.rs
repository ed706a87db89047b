//! Definition evaluator

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::BuildHasher;

use ahash::AHashMap;
use serde_json::{Map, Value};

use crate::condition::ast::Definition;

/// Anything with a key set a definition can be tested against
///
/// Only key presence is inspected; values are never read.
pub trait Candidate {
    fn contains_key(&self, key: &str) -> bool;
}

/// Evaluate a definition against a candidate
pub fn evaluate<C: Candidate + ?Sized>(definition: &Definition, candidate: &C) -> bool {
    match definition {
        Definition::Identifier(name) => candidate.contains_key(name),
        Definition::And(children) => children.iter().all(|c| evaluate(c, candidate)),
        Definition::Or(children) => children.iter().any(|c| evaluate(c, candidate)),
    }
}

impl<T: Candidate + ?Sized> Candidate for &T {
    #[inline]
    fn contains_key(&self, key: &str) -> bool {
        (**self).contains_key(key)
    }
}

impl<V, S: BuildHasher> Candidate for HashMap<String, V, S> {
    #[inline]
    fn contains_key(&self, key: &str) -> bool {
        HashMap::contains_key(self, key)
    }
}

impl<V> Candidate for AHashMap<String, V> {
    #[inline]
    fn contains_key(&self, key: &str) -> bool {
        (**self).contains_key(key)
    }
}

impl<V> Candidate for BTreeMap<String, V> {
    #[inline]
    fn contains_key(&self, key: &str) -> bool {
        BTreeMap::contains_key(self, key)
    }
}

impl<S: BuildHasher> Candidate for HashSet<String, S> {
    #[inline]
    fn contains_key(&self, key: &str) -> bool {
        self.contains(key)
    }
}

impl Candidate for BTreeSet<String> {
    #[inline]
    fn contains_key(&self, key: &str) -> bool {
        self.contains(key)
    }
}

impl Candidate for Map<String, Value> {
    #[inline]
    fn contains_key(&self, key: &str) -> bool {
        Map::contains_key(self, key)
    }
}

/// Only JSON objects have keys; every other value satisfies no identifier
impl Candidate for Value {
    fn contains_key(&self, key: &str) -> bool {
        self.as_object().is_some_and(|map| map.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::parser::parse;
    use serde_json::json;

    fn example() -> Definition {
        parse("project && (id || (name && year))").unwrap()
    }

    #[test]
    fn test_identifier() {
        let ast = parse("one").unwrap();
        assert!(evaluate(&ast, &json!({ "one": null })));
        assert!(!evaluate(&ast, &json!({})));
    }

    #[test]
    fn test_nested_expression() {
        let ast = example();
        assert!(evaluate(&ast, &json!({ "project": "ABC", "id": 123 })));
        assert!(!evaluate(&ast, &json!({ "project": "ABC", "idx": 123 })));
        assert!(evaluate(
            &ast,
            &json!({ "project": "ABC", "name": "Joe", "year": 1923 })
        ));
        assert!(!evaluate(&ast, &json!({ "id": 123 })));
        assert!(!evaluate(&ast, &json!({ "project": "ABC", "name": "Joe" })));
    }

    #[test]
    fn test_and_condition() {
        let ast = parse("one && (three && two)").unwrap();
        assert!(evaluate(&ast, &json!({ "one": 1, "two": 2, "three": 3 })));
        assert!(!evaluate(&ast, &json!({ "one": 1, "three": 3 })));
    }

    #[test]
    fn test_or_condition() {
        let ast = parse("one || two || three").unwrap();
        assert!(evaluate(&ast, &json!({ "three": 3 })));
        assert!(!evaluate(&ast, &json!({ "four": 4 })));
    }

    #[test]
    fn test_values_are_ignored() {
        let ast = parse("flag").unwrap();
        assert!(evaluate(&ast, &json!({ "flag": false })));
        assert!(evaluate(&ast, &json!({ "flag": null })));
    }

    #[test]
    fn test_non_object_json_has_no_keys() {
        let ast = parse("a").unwrap();
        assert!(!evaluate(&ast, &json!(["a"])));
        assert!(!evaluate(&ast, &json!("a")));
    }

    #[test]
    fn test_map_and_set_candidates() {
        let ast = example();

        let mut map = HashMap::new();
        map.insert("project".to_string(), 1);
        map.insert("id".to_string(), 2);
        assert!(evaluate(&ast, &map));

        let mut fast = AHashMap::new();
        fast.insert("project".to_string(), ());
        assert!(!evaluate(&ast, &fast));
        fast.insert("year".to_string(), ());
        fast.insert("name".to_string(), ());
        assert!(evaluate(&ast, &fast));

        let tree: BTreeMap<String, i32> = [("project".to_string(), 1)].into_iter().collect();
        assert!(!evaluate(&ast, &tree));

        let keys: HashSet<String> = ["project", "id"].iter().map(|s| s.to_string()).collect();
        assert!(evaluate(&ast, &keys));

        let sorted: BTreeSet<String> = ["id"].iter().map(|s| s.to_string()).collect();
        assert!(!evaluate(&ast, &sorted));
    }

    #[test]
    fn test_evaluation_is_repeatable() {
        let ast = example();
        let candidate = json!({ "project": "ABC", "id": 123 });
        let first = evaluate(&ast, &candidate);
        for _ in 0..10 {
            assert_eq!(evaluate(&ast, &candidate), first);
        }
    }
}
