//! Python bindings via PyO3
//!
//! Exposes `Rule`, `build` and `check` so Python callers can compile an
//! expression once and test plain dicts against it.

use std::collections::HashSet;

use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::condition::cache;
use crate::rule::CompiledRule;

/// Collect the string keys of a Python dict; other keys can never match
fn dict_keys(candidate: &Bound<'_, PyDict>) -> HashSet<String> {
    candidate
        .iter()
        .filter_map(|(key, _)| key.extract::<String>().ok())
        .collect()
}

// ============================================================================
// Rule PyClass
// ============================================================================

/// Compiled rule handle
///
/// Compile errors never raise; check `success` and `warnings` instead.
#[pyclass(name = "Rule")]
pub struct PyRule {
    inner: CompiledRule,
}

#[pymethods]
impl PyRule {
    #[new]
    fn new(expression: &str) -> Self {
        Self {
            inner: CompiledRule::build(expression),
        }
    }

    /// Re-compile this rule with a new expression
    fn update(&mut self, expression: &str) {
        self.inner.update(expression);
    }

    /// Whether the expression compiled
    #[getter]
    fn success(&self) -> bool {
        self.inner.success()
    }

    /// Compile error messages
    #[getter]
    fn warnings(&self) -> Vec<String> {
        self.inner.warnings().to_vec()
    }

    #[getter]
    fn expression(&self) -> &str {
        self.inner.expression()
    }

    /// Literal definition as JSON text, or None when compiling failed
    fn definition(&self) -> Option<String> {
        self.inner.definition().map(|def| def.to_json())
    }

    /// Test a dict's keys against the rule
    fn test(&self, candidate: &Bound<'_, PyDict>) -> bool {
        self.inner.test(&dict_keys(candidate))
    }

    fn __repr__(&self) -> String {
        format!(
            "Rule({:?}, success={})",
            self.inner.expression(),
            self.inner.success()
        )
    }
}

// ============================================================================
// Python Functions
// ============================================================================

/// Compile an expression into a Rule
#[pyfunction]
fn build(expression: &str) -> PyRule {
    PyRule::new(expression)
}

/// Compile (cached) and test an expression in one call
///
/// # Raises
/// ValueError if the expression does not compile
#[pyfunction]
fn check(expression: &str, candidate: &Bound<'_, PyDict>) -> PyResult<bool> {
    Ok(cache::check_condition(expression, &dict_keys(candidate))?)
}

/// Drop every cached definition
#[pyfunction]
fn clear_cache() {
    cache::clear_cache();
}

/// Python module definition
#[pymodule]
fn paramatcher(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(build, m)?)?;
    m.add_function(wrap_pyfunction!(check, m)?)?;
    m.add_function(wrap_pyfunction!(clear_cache, m)?)?;
    m.add_class::<PyRule>()?;
    Ok(())
}
