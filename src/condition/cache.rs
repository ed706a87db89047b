//! Compiled expression cache - Optimized with faster hashing

use std::sync::Arc;

use crate::condition::ast::Definition;
use crate::condition::evaluator::{evaluate, Candidate};
use crate::condition::parser;
use crate::error::Result;
use ahash::AHashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

/// Upper bound on cached definitions; once reached, new expressions are
/// compiled on every call instead of being cached
pub const MAX_CACHED_DEFINITIONS: usize = 4096;

/// Global expression cache with fast hashing (ahash)
static DEFINITION_CACHE: Lazy<RwLock<AHashMap<String, Arc<Definition>>>> = Lazy::new(|| {
    let map = AHashMap::with_capacity(256);
    RwLock::new(map)
});

/// Get or parse an expression, using cache for repeated expressions
///
/// Only successful compiles are cached; a failing expression is re-parsed
/// (and fails again) on every call. The cache holds at most
/// [`MAX_CACHED_DEFINITIONS`] expressions.
#[inline]
pub fn get_or_parse(expression: &str) -> Result<Arc<Definition>> {
    // Fast path: check read lock first
    {
        let cache = DEFINITION_CACHE.read();
        if let Some(definition) = cache.get(expression) {
            tracing::trace!(expression, "definition cache hit");
            return Ok(Arc::clone(definition));
        }
    }

    // Slow path: parse and cache
    let definition = Arc::new(parser::parse(expression)?);
    tracing::debug!(
        expression,
        nodes = definition.node_count(),
        "compiled expression into cache"
    );

    let mut cache = DEFINITION_CACHE.write();
    Ok(insert_bounded(&mut cache, expression, definition))
}

/// Insert unless full; a concurrent insert of the same expression wins so
/// every caller shares one tree
fn insert_bounded(
    cache: &mut AHashMap<String, Arc<Definition>>,
    expression: &str,
    definition: Arc<Definition>,
) -> Arc<Definition> {
    if let Some(existing) = cache.get(expression) {
        return Arc::clone(existing);
    }
    if cache.len() >= MAX_CACHED_DEFINITIONS {
        tracing::debug!(expression, "definition cache full, not caching");
        return definition;
    }
    Arc::clone(
        cache
            .entry(expression.to_string())
            .or_insert(definition),
    )
}

/// Check an expression against a candidate, using cached definition
#[inline]
pub fn check_condition<C: Candidate + ?Sized>(expression: &str, candidate: &C) -> Result<bool> {
    let definition = get_or_parse(expression)?;
    Ok(evaluate(&definition, candidate))
}

/// Clear the definition cache
pub fn clear_cache() {
    let mut cache = DEFINITION_CACHE.write();
    cache.clear();
}

/// Get cache statistics
pub fn cache_size() -> usize {
    let cache = DEFINITION_CACHE.read();
    cache.len()
}
