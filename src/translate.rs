//! Entry points tying the stages together.
//!
//! ```text
//! source ──tokenize──▶ tokens ──parse──▶ statements + symbols ──generate──▶ JavaScript
//! ```
//!
//! Each stage either succeeds completely or the whole call fails with the
//! first [`TranslateError`]; there is never partial output.

use crate::{
    codegen::Generator,
    error::TranslateError,
    lexer::tokenize,
    parser::{Parser, Program},
    signatures::{NoSignatures, SignatureLookup},
    unique::UniqueIdentifier,
};

/// Translate ABAP source to JavaScript.
///
/// Uses the process-wide identifier counter, so the loop counters in the
/// output depend on earlier calls unless [`reset_unique_identifiers`] runs
/// first. Named-argument method calls fail, as no signatures are known; use
/// [`Translator`] to supply them.
///
/// # Examples
///
/// ```
/// use abap_js::translate;
///
/// assert_eq!(translate("foo = bar + 2.").unwrap(), "foo.set(bar.add(2));");
/// assert_eq!(
///     translate("IF foo EQ bar. ENDIF.").unwrap(),
///     "if (foo.eq(bar)) {\n}"
/// );
/// ```
pub fn translate(source: &str) -> Result<String, TranslateError> {
    Translator::new().run(source)
}

/// Restart the process-wide identifier counter at `unique1`.
pub fn reset_unique_identifiers() {
    UniqueIdentifier::global().reset();
}

/// Configurable translation.
///
/// # Examples
///
/// ```
/// use abap_js::signatures::SignatureTable;
/// use abap_js::unique::UniqueIdentifier;
/// use abap_js::Translator;
///
/// let ids = UniqueIdentifier::new();
/// let signatures = SignatureTable::from_json(r#"{"method": ["moo", "bar"]}"#).unwrap();
///
/// let js = Translator::new()
///     .with_identifiers(&ids)
///     .with_signatures(&signatures)
///     .run("foo->method( bar = 2 moo = 1 ).")
///     .unwrap();
/// assert_eq!(js, "foo.method(1, 2);");
/// ```
pub struct Translator<'a> {
    identifiers: &'a UniqueIdentifier,
    signatures: &'a dyn SignatureLookup,
}

impl Default for Translator<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Translator<'a> {
    pub fn new() -> Self {
        Translator {
            identifiers: UniqueIdentifier::global(),
            signatures: &NoSignatures,
        }
    }

    /// Draw loop counters and labels from `identifiers` instead of the
    /// process-wide counter.
    pub fn with_identifiers(mut self, identifiers: &'a UniqueIdentifier) -> Self {
        self.identifiers = identifiers;
        self
    }

    pub fn with_signatures(mut self, signatures: &'a dyn SignatureLookup) -> Self {
        self.signatures = signatures;
        self
    }

    /// Lex and parse only.
    pub fn parse(&self, source: &str) -> Result<Program, TranslateError> {
        let tokens = tokenize(source)?;
        Parser::new(tokens).parse_program()
    }

    pub fn generate(&self, program: &Program) -> Result<String, TranslateError> {
        Generator::new(&program.symbols, self.identifiers, self.signatures)
            .run(&program.statements)
    }

    pub fn run(&self, source: &str) -> Result<String, TranslateError> {
        let program = self.parse(source)?;
        self.generate(&program)
    }
}
