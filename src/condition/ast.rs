//! Compiled expression tree
//!
//! A [`Definition`] is either a single identifier or an operator node over an
//! ordered list of children. The serde form matches the literal definition
//! objects used by callers: identifiers are strings, operator nodes are
//! `{"$and": [...]}` / `{"$or": [...]}`.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{ParamatcherError, Result};

/// Compiled expression node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "Literal")]
pub enum Definition {
    /// Key that must be present on the candidate
    Identifier(String),
    /// Every child must hold
    And(Vec<Definition>),
    /// At least one child must hold
    Or(Vec<Definition>),
}

/// Boolean operators joining the operands of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    /// And (&&)
    And,
    /// Or (||)
    Or,
}

impl LogicalOperator {
    /// Resolve an operator token, `None` for anything other than `&&` / `||`
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "&&" => Some(LogicalOperator::And),
            "||" => Some(LogicalOperator::Or),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOperator::And => "&&",
            LogicalOperator::Or => "||",
        }
    }

    /// Key used for this operator in literal definitions
    pub fn literal_key(&self) -> &'static str {
        match self {
            LogicalOperator::And => "$and",
            LogicalOperator::Or => "$or",
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Definition {
    /// Build an operator node from its operator and operands
    pub fn group(operator: LogicalOperator, children: Vec<Definition>) -> Self {
        match operator {
            LogicalOperator::And => Definition::And(children),
            LogicalOperator::Or => Definition::Or(children),
        }
    }

    #[inline]
    pub fn is_identifier(&self) -> bool {
        matches!(self, Definition::Identifier(_))
    }

    /// Operator of this node, `None` for identifiers
    pub fn operator(&self) -> Option<LogicalOperator> {
        match self {
            Definition::Identifier(_) => None,
            Definition::And(_) => Some(LogicalOperator::And),
            Definition::Or(_) => Some(LogicalOperator::Or),
        }
    }

    /// Operands of an operator node; empty for identifiers
    pub fn children(&self) -> &[Definition] {
        match self {
            Definition::Identifier(_) => &[],
            Definition::And(children) | Definition::Or(children) => children,
        }
    }

    /// Total number of nodes in this tree
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(Definition::node_count).sum::<usize>()
    }

    /// Parse a literal definition from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render this tree as a literal definition
    pub fn to_json(&self) -> String {
        // A Definition serializes to strings, maps and sequences only
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Renders canonical expression text; nested operator nodes are parenthesized
impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Definition::Identifier(name) => f.write_str(name),
            Definition::And(children) => write_operands(f, LogicalOperator::And, children),
            Definition::Or(children) => write_operands(f, LogicalOperator::Or, children),
        }
    }
}

fn write_operands(
    f: &mut fmt::Formatter<'_>,
    operator: LogicalOperator,
    children: &[Definition],
) -> fmt::Result {
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, " {} ", operator)?;
        }
        if child.is_identifier() {
            write!(f, "{}", child)?;
        } else {
            write!(f, "({})", child)?;
        }
    }
    Ok(())
}

impl Serialize for Definition {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Definition::Identifier(name) => serializer.serialize_str(name),
            Definition::And(children) | Definition::Or(children) => {
                let key = self.operator().map_or("$and", |op| op.literal_key());
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(key, children)?;
                map.end()
            }
        }
    }
}

// ============================================================================
// Literal definition deserialization
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum Literal {
    Identifier(String),
    And(AndLiteral),
    Or(OrLiteral),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct AndLiteral {
    #[serde(rename = "$and")]
    and: Vec<Definition>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct OrLiteral {
    #[serde(rename = "$or")]
    or: Vec<Definition>,
}

impl TryFrom<Literal> for Definition {
    type Error = ParamatcherError;

    fn try_from(literal: Literal) -> Result<Self> {
        match literal {
            Literal::Identifier(name) => Ok(Definition::Identifier(name)),
            Literal::And(AndLiteral { and }) if and.is_empty() => {
                Err(ParamatcherError::EmptyOperator("$and"))
            }
            Literal::And(AndLiteral { and }) => Ok(Definition::And(and)),
            Literal::Or(OrLiteral { or }) if or.is_empty() => {
                Err(ParamatcherError::EmptyOperator("$or"))
            }
            Literal::Or(OrLiteral { or }) => Ok(Definition::Or(or)),
        }
    }
}
