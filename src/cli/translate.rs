//! Translate ABAP source for the command line

use super::CliError;
use crate::{
    Parser, SignatureTable, Translator, lexer::tokenize, reset_unique_identifiers,
    unique::reserved_collisions,
};

/// Options for the translate command
#[derive(Debug, Clone, Default)]
pub struct TranslateOptions {
    /// ABAP source text
    pub source: String,
    /// Signature table as JSON text
    pub signatures: Option<String>,
    /// Only lex and parse, don't generate
    pub syntax_only: bool,
    /// Reset the loop-counter names before translating
    pub fresh: bool,
}

/// Counts reported by `--verbose` and `--json`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslateStats {
    pub tokens: usize,
    pub statements: usize,
    /// Declared names with their runtime type, in declaration order
    pub symbols: Vec<(String, String)>,
    /// Source identifiers shaped like generated names
    pub reserved_collisions: Vec<String>,
}

/// Result of a translate operation
#[derive(Debug)]
pub enum TranslateResult {
    /// Syntax validation passed
    SyntaxValid(TranslateStats),
    /// Translation produced JavaScript
    Success {
        javascript: String,
        stats: TranslateStats,
    },
}

impl TranslateResult {
    pub fn stats(&self) -> &TranslateStats {
        match self {
            TranslateResult::SyntaxValid(stats) => stats,
            TranslateResult::Success { stats, .. } => stats,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let stats = self.stats();
        let symbols: Vec<serde_json::Value> = stats
            .symbols
            .iter()
            .map(|(name, descriptor)| serde_json::json!({"name": name, "type": descriptor}))
            .collect();

        let mut report = serde_json::json!({
            "tokens": stats.tokens,
            "statements": stats.statements,
            "symbols": symbols,
            "reservedCollisions": stats.reserved_collisions,
        });
        if let TranslateResult::Success { javascript, .. } = self {
            report["javascript"] = serde_json::Value::String(javascript.clone());
        }
        report
    }
}

/// Execute an abapjs translate operation
pub fn execute_translate(options: &TranslateOptions) -> Result<TranslateResult, CliError> {
    let signatures = match &options.signatures {
        Some(json) => SignatureTable::from_json(json)?,
        None => SignatureTable::new(),
    };

    let tokens = tokenize(&options.source).map_err(|e| CliError::Translate(e.into()))?;
    let reserved_collisions = reserved_collisions(&tokens);
    let token_count = tokens.len();

    let program = Parser::new(tokens).parse_program()?;
    let stats = TranslateStats {
        tokens: token_count,
        statements: program.statements.len(),
        symbols: program
            .symbols
            .symbols()
            .into_iter()
            .map(|symbol| (symbol.name.clone(), symbol.descriptor.to_string()))
            .collect(),
        reserved_collisions,
    };

    if options.syntax_only {
        return Ok(TranslateResult::SyntaxValid(stats));
    }

    if options.fresh {
        reset_unique_identifiers();
    }

    let javascript = Translator::new()
        .with_signatures(&signatures)
        .generate(&program)?;

    Ok(TranslateResult::Success { javascript, stats })
}
