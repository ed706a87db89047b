//! Expression compiler
//!
//! Compiles expressions like `project && (id || (name && year))` by
//! repeatedly extracting the innermost parenthesized group, turning it into a
//! [`Definition`] and substituting a placeholder token for it, until the whole
//! expression has collapsed to a single root node.

use std::fmt;

use crate::condition::ast::{Definition, LogicalOperator};
use crate::error::{ParamatcherError, Result};

/// Parse an expression string into a definition tree
pub fn parse(expression: &str) -> Result<Definition> {
    let mut tokens = Vec::with_capacity(expression.len() / 2 + 2);
    tokens.push(Token::OpenParen);
    tokenize(expression, &mut tokens);
    tokens.push(Token::CloseParen);

    let mut store = NodeStore::default();

    // The right-most '(' always pairs with the nearest ')' after it
    while let Some(open) = tokens.iter().rposition(|t| *t == Token::OpenParen) {
        let Some(close) = tokens[open + 1..]
            .iter()
            .position(|t| *t == Token::CloseParen)
            .map(|offset| open + 1 + offset)
        else {
            // An unclosed '(' ends extraction; the last group compiled is the root
            return match store.last_index() {
                Some(root) => store.take(root),
                None => Err(ParamatcherError::UnbalancedGrouping),
            };
        };

        let node = gen_notation(&tokens[open + 1..close], &mut store)?;
        let index = store.push(node);
        tokens.splice(open..=close, std::iter::once(Token::Group(index)));
    }

    // A stray ')' leaves more than the root behind
    match tokens.as_slice() {
        [Token::Group(root)] => store.take(*root),
        _ => Err(ParamatcherError::UnbalancedGrouping),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    /// Placeholder for an already compiled group
    Group(usize),
    OpenParen,
    CloseParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(word) => f.write_str(word),
            Token::Group(_) => f.write_str("(...)"),
            Token::OpenParen => f.write_str("("),
            Token::CloseParen => f.write_str(")"),
        }
    }
}

/// Nodes produced so far within one compile; indexed by placeholder
#[derive(Debug, Default)]
struct NodeStore {
    nodes: Vec<Option<Definition>>,
}

impl NodeStore {
    fn push(&mut self, node: Definition) -> usize {
        self.nodes.push(Some(node));
        self.nodes.len() - 1
    }

    fn last_index(&self) -> Option<usize> {
        self.nodes.len().checked_sub(1)
    }

    /// Each placeholder appears exactly once, so its node is moved out
    fn take(&mut self, index: usize) -> Result<Definition> {
        self.nodes
            .get_mut(index)
            .and_then(Option::take)
            .ok_or(ParamatcherError::UnresolvedGroup(index))
    }
}

fn tokenize(expression: &str, tokens: &mut Vec<Token>) {
    let mut current = String::new();

    for c in expression.chars() {
        match c {
            '(' | ')' => {
                if !current.is_empty() {
                    tokens.push(Token::Word(std::mem::take(&mut current)));
                }
                tokens.push(if c == '(' {
                    Token::OpenParen
                } else {
                    Token::CloseParen
                });
            }
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(Token::Word(std::mem::take(&mut current)));
                }
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        tokens.push(Token::Word(current));
    }
}

/// Convert the contents of one group into a node
fn gen_notation(contents: &[Token], store: &mut NodeStore) -> Result<Definition> {
    if contents.len() == 1 {
        return resolve(&contents[0], store);
    }

    if contents.len() % 2 == 0 {
        return Err(ParamatcherError::MalformedGroupArity {
            found: contents.len(),
        });
    }

    let first = &contents[1];
    if let Some(other) = contents.iter().skip(3).step_by(2).find(|t| *t != first) {
        return Err(ParamatcherError::HeterogeneousOperators {
            expected: first.to_string(),
            found: other.to_string(),
        });
    }

    let operator = match first {
        Token::Word(word) => LogicalOperator::from_token(word),
        _ => None,
    }
    .ok_or_else(|| ParamatcherError::UnknownOperator(first.to_string()))?;

    let children = contents
        .iter()
        .step_by(2)
        .map(|t| resolve(t, store))
        .collect::<Result<Vec<_>>>()?;

    Ok(Definition::group(operator, children))
}

fn resolve(token: &Token, store: &mut NodeStore) -> Result<Definition> {
    match token {
        Token::Word(word) => Ok(Definition::Identifier(word.clone())),
        Token::Group(index) => store.take(*index),
        // Parentheses never survive inside an extracted group
        Token::OpenParen | Token::CloseParen => Err(ParamatcherError::UnbalancedGrouping),
    }
}
