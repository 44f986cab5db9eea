use crate::ast::Expr;

/// Shape of the left-hand side of an assignment.
///
/// Extracted from the target expression and used to pick the form of the
/// generated `set` call.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget<'a> {
    /// The whole value is replaced
    ///
    /// # Examples
    /// - `foo = 2.` → `foo.set(2);`
    /// - `foo-bar = 2.` → `foo.bar.set(2);`
    /// - `lo_obj->mv_count = 2.` → `lo_obj.mv_count.set(2);`
    Whole(&'a Expr),

    /// Only a substring is replaced; missing parts stay `None`
    ///
    /// # Examples
    /// - `foo(1) = 'a'.` → length only
    /// - `foo+1 = 'a'.` → offset only
    /// - `foo+1(1) = 'a'.` → offset and length
    Section {
        base: &'a Expr,
        offset: Option<&'a Expr>,
        length: Option<&'a Expr>,
    },
}

/// Why an expression cannot be assigned to.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetError {
    Literal,
    Computed,
    Call,
}

impl std::fmt::Display for TargetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetError::Literal => f.write_str("a literal cannot be assigned to"),
            TargetError::Computed => f.write_str("a computed value cannot be assigned to"),
            TargetError::Call => f.write_str("a call result cannot be assigned to"),
        }
    }
}

/// Extract the assignment form of a target expression.
///
/// # Examples
/// ```
/// use abap_js::ast::Expr;
/// use abap_js::transform::{assignment_target, AssignTarget};
///
/// let foo = Expr::identifier("foo");
/// assert_eq!(assignment_target(&foo), Ok(AssignTarget::Whole(&foo)));
///
/// assert!(assignment_target(&Expr::number(1)).is_err());
/// ```
pub fn assignment_target(expr: &Expr) -> Result<AssignTarget<'_>, TargetError> {
    match expr {
        Expr::Identifier(_) | Expr::MemberAccess { .. } => {
            if is_reference(expr) {
                Ok(AssignTarget::Whole(expr))
            } else {
                Err(TargetError::Call)
            }
        }

        Expr::OffsetLengthAccess {
            base,
            offset,
            length,
        } => {
            if !is_reference(base) {
                return Err(TargetError::Computed);
            }
            Ok(AssignTarget::Section {
                base,
                offset: offset.as_deref(),
                length: length.as_deref(),
            })
        }

        Expr::Literal(_) | Expr::StringTemplate(_) => Err(TargetError::Literal),
        Expr::BuiltinCall { .. } | Expr::MethodCall { .. } => Err(TargetError::Call),
        Expr::BinaryOp { .. } | Expr::UnaryOp { .. } => Err(TargetError::Computed),
    }
}

/// True for a name or a chain of component accesses on a name, possibly
/// through method call results (`lo_obj->get( )->mv_value`).
pub fn is_reference(expr: &Expr) -> bool {
    match expr {
        Expr::Identifier(_) => true,
        Expr::MemberAccess { base, .. } => {
            is_reference(base) || matches!(base.as_ref(), Expr::MethodCall { .. })
        }
        _ => false,
    }
}

