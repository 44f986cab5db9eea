//! Declared names of one compilation unit.
//!
//! The parser records every `DATA` statement here. The table is flat: a
//! name declared in a FORM and a name declared at top level share one entry,
//! and a later declaration replaces an earlier one.

use std::collections::HashMap;

use thiserror::Error;

use crate::ast::{DataOptions, TypeRef};
use crate::lexer::Position;
use crate::value::TypeDescriptor;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown type '{type_name}' in declaration of '{name}' at {position}")]
pub struct DeclarationError {
    pub name: String,
    pub type_name: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    /// Name as written in the declaration
    pub name: String,
    pub descriptor: TypeDescriptor,
    pub options: DataOptions,
    pub position: Position,
}

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    // keyed by lower-cased name, ABAP names are case-insensitive
    entries: HashMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps a written type to its descriptor.
    ///
    /// Only `i`, `c`, `string` and tables of those are known; anything else
    /// is an error rather than a silent default.
    pub fn resolve(
        name: &str,
        type_ref: &TypeRef,
        position: Position,
    ) -> Result<TypeDescriptor, DeclarationError> {
        let unknown = || DeclarationError {
            name: name.to_string(),
            type_name: type_ref.to_string(),
            position,
        };

        match type_ref {
            TypeRef::Named(keyword) => TypeDescriptor::from_keyword(keyword).ok_or_else(unknown),
            TypeRef::TableOf(element) => TypeDescriptor::from_keyword(element)
                .map(|element| TypeDescriptor::Table(Box::new(element)))
                .ok_or_else(unknown),
            TypeRef::RefTo(_) => Err(unknown()),
        }
    }

    /// Registers `name`, replacing any earlier entry with the same name.
    pub fn declare(
        &mut self,
        name: &str,
        type_ref: &TypeRef,
        options: DataOptions,
        position: Position,
    ) -> Result<&Symbol, DeclarationError> {
        let descriptor = Self::resolve(name, type_ref, position)?;
        let symbol = Symbol {
            name: name.to_string(),
            descriptor,
            options,
            position,
        };

        let key = name.to_ascii_lowercase();
        self.entries.insert(key.clone(), symbol);
        Ok(&self.entries[&key])
    }

    /// Declared type of `name`, or `Unknown` when never declared.
    pub fn lookup(&self, name: &str) -> TypeDescriptor {
        self.get(name)
            .map(|symbol| symbol.descriptor.clone())
            .unwrap_or(TypeDescriptor::Unknown)
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.entries.get(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by declaration position.
    pub fn symbols(&self) -> Vec<&Symbol> {
        let mut symbols: Vec<&Symbol> = self.entries.values().collect();
        symbols.sort_by_key(|symbol| symbol.position);
        symbols
    }
}
