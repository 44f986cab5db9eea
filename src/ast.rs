//! # ABAP Syntax Tree
//!
//! Types shared by the lexer, parser and code generator.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Expression nodes (literals, access, operations, calls)
//! - **[operators]** - Binary and unary operators
//! - **[statements]** - Statement nodes, blocks and declarations
//!
//! ## Core Concepts
//!
//! ### Statements and blocks
//!
//! A statement is one period-terminated source unit. Block constructs
//! (`IF ... ENDIF`, `DO ... ENDDO`, `FORM ... ENDFORM`, ...) appear as a
//! single statement node holding the nested statements:
//!
//! ```text
//! IF foo = bar.
//!   WRITE foo.
//! ENDIF.
//! ```
//!
//! becomes `Statement::If` with one branch whose body is a `RuntimeCall`.
//!
//! ### Context-dependent punctuation
//!
//! ABAP reuses `-`, `+` and `(` depending on spacing. The tree keeps the
//! readings apart as distinct variants:
//!
//! - `foo-bar` → `Expr::MemberAccess`, `foo - bar` → subtraction
//! - `foo+1(2)` → `Expr::OffsetLengthAccess`, `foo + 1` → addition
//! - `lines( foo )` → `Expr::BuiltinCall`, `foo(2)` → length access
pub mod expressions;
pub mod operators;
pub mod statements;
pub mod tokens;

pub use expressions::{CallArgs, Expr, Literal, TemplateSegment};
pub use operators::{BinOp, UnaryOp};
pub use statements::{
    Block, Branch, CaseArm, DataDeclaration, DataOptions, RuntimeCall, Spanned, SplitTarget,
    Statement, StatementKind, TypeRef,
};
pub use tokens::{Keyword, TemplatePart, Token, TokenKind};
