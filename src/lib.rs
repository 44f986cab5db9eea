pub mod ast;
pub mod cli;
pub mod codegen;
pub mod error;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod signatures;
pub mod symbols;
pub mod transform;
pub mod translate;
pub mod unique;
pub mod value;

pub use ast::{BinOp, Expr, Statement, Token};
pub use codegen::{Construct, Generator, UnsupportedConstructError, generate};
pub use error::TranslateError;
pub use lexer::{LexError, Lexer, Position, tokenize};
pub use parser::{ParseError, Parser, Program, parse};
pub use signatures::{SignatureLookup, SignatureResolutionError, SignatureTable};
pub use symbols::{DeclarationError, SymbolTable};
pub use translate::{Translator, reset_unique_identifiers, translate};
pub use unique::UniqueIdentifier;
pub use value::TypeDescriptor;
