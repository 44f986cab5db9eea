//! Parameter order of called methods.
//!
//! JavaScript has only positional arguments, so `foo->method( bar = 2 moo = 1 )`
//! can only be emitted once the declared parameter order of `method` is
//! known. Method signatures live in class definitions this crate does not
//! parse, so the order comes from a [`SignatureLookup`] supplied by the
//! caller.

use std::collections::HashMap;

use thiserror::Error;

use crate::lexer::Position;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot resolve parameter order of '{method}' at {position}: {reason}")]
pub struct SignatureResolutionError {
    pub method: String,
    pub reason: String,
    pub position: Position,
}

/// Source of declared parameter order for named-argument calls.
pub trait SignatureLookup {
    /// Parameter names of `method` in declaration order.
    ///
    /// `receiver` is the translated receiver expression (`foo`, `this`,
    /// `lcl_util`). `None` means the order is unknown.
    fn parameter_order(&self, receiver: &str, method: &str) -> Option<Vec<String>>;
}

/// Lookup that knows no signatures; every named-argument call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSignatures;

impl SignatureLookup for NoSignatures {
    fn parameter_order(&self, _receiver: &str, _method: &str) -> Option<Vec<String>> {
        None
    }
}

/// Fixed table of signatures keyed by `method` or `receiver->method`.
///
/// Keys and parameter names match case-insensitively. A
/// `receiver->method` entry wins over a bare `method` entry.
///
/// # Examples
///
/// ```
/// use abap_js::signatures::{SignatureLookup, SignatureTable};
///
/// let table = SignatureTable::from_json(r#"{"method": ["moo", "bar"]}"#).unwrap();
/// assert_eq!(
///     table.parameter_order("foo", "METHOD"),
///     Some(vec!["moo".to_string(), "bar".to_string()])
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct SignatureTable {
    entries: HashMap<String, Vec<String>>,
}

impl SignatureTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, parameters: Vec<String>) {
        let parameters = parameters
            .into_iter()
            .map(|p| p.to_ascii_lowercase())
            .collect();
        self.entries.insert(key.to_ascii_lowercase(), parameters);
    }

    /// Reads an object mapping keys to arrays of parameter names.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: HashMap<String, Vec<String>> = serde_json::from_str(json)?;
        let mut table = SignatureTable::new();
        for (key, parameters) in raw {
            table.insert(&key, parameters);
        }
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SignatureLookup for SignatureTable {
    fn parameter_order(&self, receiver: &str, method: &str) -> Option<Vec<String>> {
        let qualified = format!("{}->{}", receiver, method).to_ascii_lowercase();
        self.entries
            .get(&qualified)
            .or_else(|| self.entries.get(&method.to_ascii_lowercase()))
            .cloned()
    }
}
