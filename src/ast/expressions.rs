use rust_decimal::Decimal;

use crate::ast::{BinOp, UnaryOp};

/// Expression node.
///
/// Every ABAP value is a value object in the generated code, so the tree is
/// purely structural: no node carries type information.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // Literals
    /// Literal number or string
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 'fo'
    /// `fo`
    /// ```
    Literal(Literal),

    /// String template with embedded expressions
    ///
    /// # Example
    /// ```text
    /// |Hello { name }!|
    /// ```
    StringTemplate(Vec<TemplateSegment>),

    // References
    /// Variable, constant or pseudo-field name
    Identifier(String),

    // Access
    /// Component access
    ///
    /// # Examples
    /// ```text
    /// sy-subrc
    /// ls_line-name
    /// ```
    MemberAccess { base: Box<Expr>, field: String },

    /// Substring access; a missing part is `None`, never zero
    ///
    /// # Examples
    /// ```text
    /// foo+1       // offset only
    /// foo(2)      // length only
    /// foo+1(2)    // both
    /// ```
    OffsetLengthAccess {
        base: Box<Expr>,
        offset: Option<Box<Expr>>,
        length: Option<Box<Expr>>,
    },

    // Operations
    /// Arithmetic, comparison or logical operation
    BinaryOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Negation, `NOT`, or `IS INITIAL`
    UnaryOp { op: UnaryOp, operand: Box<Expr> },

    // Calls
    /// Built-in function call
    ///
    /// # Example
    /// ```text
    /// lines( lt_words )
    /// ```
    BuiltinCall { name: String, args: CallArgs },

    /// Instance or static method call
    ///
    /// # Examples
    /// ```text
    /// foo->method( )
    /// foo->method( bar = 2 moo = 1 )
    /// lcl_util=>create( 1 )
    /// ```
    MethodCall {
        receiver: Box<Expr>,
        method: String,
        args: CallArgs,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(Decimal),
    /// `'...'` literal
    Text(String),
    /// `` `...` `` literal
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateSegment {
    Literal(String),
    Embedded(Expr),
}

/// Argument list of a call.
#[derive(Debug, Clone, PartialEq)]
pub enum CallArgs {
    /// `( )` or `( value )`
    Positional(Vec<Expr>),
    /// `( name = value name = value ... )`, in source order
    Named(Vec<(String, Expr)>),
}

impl Expr {
    pub fn identifier(name: impl Into<String>) -> Expr {
        Expr::Identifier(name.into())
    }

    pub fn number(n: i64) -> Expr {
        Expr::Literal(Literal::Number(Decimal::from(n)))
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
        Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
        Expr::UnaryOp {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Expr::Literal(_) | Expr::StringTemplate(_))
    }
}
