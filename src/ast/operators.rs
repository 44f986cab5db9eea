/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinOp {
    // Comparison
    /// Equal (`=`, `EQ`)
    Equal,
    /// Not equal (`<>`, `NE`)
    NotEqual,
    /// Less than (`<`, `LT`)
    LessThan,
    /// Greater than (`>`, `GT`)
    GreaterThan,
    /// Less than or equal (`<=`, `LE`)
    LessEqual,
    /// Greater than or equal (`>=`, `GE`)
    GreaterEqual,

    // Arithmetic
    /// Addition (`+`)
    Add,
    /// Subtraction (`-`)
    Subtract,
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`)
    Divide,
    /// Remainder (`MOD`)
    Modulo,
    /// Integer division (`DIV`)
    IntDivide,
    /// Exponentiation (`**`)
    Power,

    // Logical
    /// Logical AND (`AND`)
    And,
    /// Logical OR (`OR`)
    Or,
}

impl BinOp {
    /// Runtime method implementing an arithmetic or comparison operator on
    /// a value object. `NotEqual` maps to `eq` and is negated by the caller.
    pub fn runtime_method(&self) -> Option<&'static str> {
        match self {
            BinOp::Equal | BinOp::NotEqual => Some("eq"),
            BinOp::LessThan => Some("lt"),
            BinOp::GreaterThan => Some("gt"),
            BinOp::LessEqual => Some("le"),
            BinOp::GreaterEqual => Some("ge"),
            BinOp::Add => Some("add"),
            BinOp::Subtract => Some("minus"),
            BinOp::Multiply => Some("multiply"),
            BinOp::Divide => Some("divide"),
            BinOp::Modulo => Some("mod"),
            BinOp::IntDivide => Some("div"),
            BinOp::Power => Some("power"),
            BinOp::And | BinOp::Or => None,
        }
    }

    /// Operator giving the same result with the operands swapped:
    /// `a + b` = `b + a`, `a < b` = `b > a`. `None` for operators where
    /// order matters.
    pub fn mirrored(&self) -> Option<BinOp> {
        match self {
            BinOp::Equal | BinOp::NotEqual | BinOp::Add | BinOp::Multiply => Some(*self),
            BinOp::LessThan => Some(BinOp::GreaterThan),
            BinOp::GreaterThan => Some(BinOp::LessThan),
            BinOp::LessEqual => Some(BinOp::GreaterEqual),
            BinOp::GreaterEqual => Some(BinOp::LessEqual),
            _ => None,
        }
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    /// Arithmetic negation (`-x`)
    Negate,
    /// Logical negation (`NOT`, and the `NOT` of `IS NOT INITIAL`)
    Not,
    /// Initial-value predicate (`x IS INITIAL`)
    IsInitial,
}
