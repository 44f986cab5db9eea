//! JavaScript generation from parsed statements.
//!
//! Every ABAP variable is a value object of the runtime library, so the
//! generated code never touches raw values: assignments go through `set`,
//! arithmetic and comparisons through methods such as `add` and `eq`, and
//! statements with no JavaScript counterpart call into `abap.statements`.
//!
//! ```text
//! foo = bar + 2.          →  foo.set(bar.add(2));
//! IF foo <> bar. ENDIF.   →  if (!foo.eq(bar)) {
//!                            }
//! DO 5 TIMES. ENDDO.      →  for (let unique1 = 0; unique1 < 5; unique1++) {
//!                            }
//! ```
//!
//! Loop counters and loop labels come from a [`UniqueIdentifier`].

use std::fmt;

use thiserror::Error;

use crate::{
    ast::{
        BinOp, Block, CallArgs, DataDeclaration, Expr, Literal, RuntimeCall, Spanned, SplitTarget,
        Statement, StatementKind, TemplateSegment, UnaryOp,
    },
    error::TranslateError,
    lexer::Position,
    output::{JsWriter, escape_template, quote_text},
    signatures::{NoSignatures, SignatureLookup, SignatureResolutionError},
    symbols::SymbolTable,
    transform::{AssignTarget, assignment_target},
    unique::UniqueIdentifier,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported {construct} in {statement} at {position}")]
pub struct UnsupportedConstructError {
    pub construct: Construct,
    /// Kind of the statement being translated
    pub statement: StatementKind,
    pub position: Position,
}

/// Statement or expression shape without a translation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Construct {
    /// A whole statement kind, such as `READ TABLE` or `DELETE` without `WHERE`
    Statement(StatementKind),
    /// `foo+1(2)` used as a value
    OffsetLengthRead,
    /// `foo-bar+1 = ...`
    OffsetLengthOnMember,
    /// A literal left operand that cannot be moved to the right, as in
    /// `0 = 1` or `2 - foo`: a literal has no methods to call
    LiteralReceiver,
    /// `-foo`
    Negation,
    /// `SPLIT ... INTO a b c`
    SplitIntoFields,
    /// `CONTINUE` in a FORM or METHOD outside any loop
    ContinueOutsideLoop,
    /// `RETURN` inside a loop outside any FORM or METHOD
    ReturnInsideLoop,
    /// `EXIT` or `RETURN` in a `CASE` outside any loop, FORM or METHOD;
    /// `break` would only leave the `switch`
    ExitFromTopLevelCase,
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Construct::Statement(kind) => write!(f, "statement {}", kind),
            Construct::OffsetLengthRead => f.write_str("offset/length access outside an assignment target"),
            Construct::OffsetLengthOnMember => f.write_str("offset/length access on a component"),
            Construct::LiteralReceiver => f.write_str("literal as operand receiver"),
            Construct::Negation => f.write_str("negation of a non-literal"),
            Construct::SplitIntoFields => f.write_str("SPLIT INTO fields"),
            Construct::ContinueOutsideLoop => f.write_str("CONTINUE outside a loop"),
            Construct::ReturnInsideLoop => f.write_str("RETURN inside a top-level loop"),
            Construct::ExitFromTopLevelCase => f.write_str("early exit from a top-level CASE"),
        }
    }
}

type GenResult<T> = Result<T, TranslateError>;

/// Enclosing construct, innermost last.
#[derive(Debug)]
enum Scope {
    Loop { label: Option<String> },
    Switch,
    Callable,
}

pub struct Generator<'a> {
    symbols: &'a SymbolTable,
    identifiers: &'a UniqueIdentifier,
    signatures: &'a dyn SignatureLookup,
    writer: JsWriter,
    scopes: Vec<Scope>,
    position: Position,
    statement: StatementKind,
}

impl<'a> Generator<'a> {
    pub fn new(
        symbols: &'a SymbolTable,
        identifiers: &'a UniqueIdentifier,
        signatures: &'a dyn SignatureLookup,
    ) -> Self {
        Generator {
            symbols,
            identifiers,
            signatures,
            writer: JsWriter::new(),
            scopes: Vec::new(),
            position: Position::default(),
            statement: StatementKind::Comment,
        }
    }

    /// Translate a whole program.
    pub fn run(mut self, statements: &[Spanned<Statement>]) -> GenResult<String> {
        self.emit_block(statements)?;
        Ok(self.writer.finish())
    }

    fn unsupported(&self, construct: Construct) -> TranslateError {
        UnsupportedConstructError {
            construct,
            statement: self.statement.clone(),
            position: self.position,
        }
        .into()
    }

    fn emit_block(&mut self, block: &[Spanned<Statement>]) -> GenResult<()> {
        for statement in block {
            self.position = statement.position;
            self.statement = statement.node.kind();
            self.emit_statement(&statement.node)?;
        }
        Ok(())
    }

    /// Emits a nested block inside `scope`.
    fn emit_scoped(&mut self, scope: Scope, block: &[Spanned<Statement>]) -> GenResult<()> {
        self.scopes.push(scope);
        let result = self.emit_block(block);
        self.scopes.pop();
        result
    }

    fn emit_statement(&mut self, statement: &Statement) -> GenResult<()> {
        match statement {
            Statement::DataDeclaration(decl) => self.emit_data(decl),

            Statement::Assignment { target, value } => {
                let value = self.expr(value)?;
                let line = match assignment_target(target) {
                    Ok(AssignTarget::Whole(target)) => {
                        format!("{}.set({});", self.expr(target)?, value)
                    }
                    Ok(AssignTarget::Section {
                        base,
                        offset,
                        length,
                    }) => {
                        if matches!(base, Expr::MemberAccess { .. }) {
                            return Err(self.unsupported(Construct::OffsetLengthOnMember));
                        }
                        let mut options = Vec::new();
                        if let Some(offset) = offset {
                            options.push(format!("offset: {}", self.expr(offset)?));
                        }
                        if let Some(length) = length {
                            options.push(format!("length: {}", self.expr(length)?));
                        }
                        format!(
                            "{}.set({}, {{{}}});",
                            self.expr(base)?,
                            value,
                            options.join(", ")
                        )
                    }
                    Err(_) => {
                        return Err(self.unsupported(Construct::Statement(StatementKind::Assignment)));
                    }
                };
                self.writer.line(line);
                Ok(())
            }

            Statement::If {
                branches,
                else_block,
            } => {
                for (i, branch) in branches.iter().enumerate() {
                    let condition = self.expr(&branch.condition)?;
                    if i == 0 {
                        self.writer.open(format!("if ({}) {{", condition));
                    } else {
                        self.writer.reopen(format!("}} else if ({}) {{", condition));
                    }
                    self.emit_block(&branch.body)?;
                }
                if let Some(else_block) = else_block {
                    self.writer.reopen("} else {");
                    self.emit_block(else_block)?;
                }
                self.writer.close("}");
                Ok(())
            }

            Statement::Case {
                selector,
                arms,
                default,
            } => {
                let selector = self.value(selector)?;
                self.writer.open(format!("switch ({}) {{", selector));
                for arm in arms {
                    for value in &arm.values {
                        let label = self.value(value)?;
                        self.writer.line(format!("case {}:", label));
                    }
                    self.emit_case_body(&arm.body)?;
                }
                if let Some(default) = default {
                    self.writer.line("default:");
                    self.emit_case_body(default)?;
                }
                self.writer.close("}");
                Ok(())
            }

            Statement::Do { count, body } => {
                let header = match count {
                    Some(count) => {
                        let limit = self.value(count)?;
                        let counter = self.identifiers.next();
                        format!(
                            "for (let {c} = 0; {c} < {limit}; {c}++) {{",
                            c = counter,
                            limit = limit
                        )
                    }
                    None => "for (;;) {".to_string(),
                };
                self.emit_loop(header, body)
            }

            Statement::While { condition, body } => {
                let header = format!("while ({}) {{", self.expr(condition)?);
                self.emit_loop(header, body)
            }

            Statement::LoopAt {
                table,
                binding,
                body,
            } => {
                let header = format!("for ({} of {}.array()) {{", binding, self.expr(table)?);
                self.emit_loop(header, body)
            }

            Statement::Form { name, body } => {
                self.writer.open(format!("function {}() {{", name));
                self.emit_scoped(Scope::Callable, body)?;
                self.writer.close("}");
                Ok(())
            }

            Statement::Perform { name } => {
                self.writer.line(format!("{}();", name));
                Ok(())
            }

            Statement::ClassImplementation { name, methods } => {
                self.writer.open(format!("class {} {{", name));
                self.emit_block(methods)?;
                self.writer.close("}");
                Ok(())
            }

            // definitions only declare; implementations carry the code
            Statement::ClassDefinition { .. } => Ok(()),

            Statement::MethodDefinition { name, body } => {
                self.writer.open(format!("{}() {{", name));
                self.emit_scoped(Scope::Callable, body)?;
                self.writer.close("}");
                Ok(())
            }

            Statement::MethodCall(call) => {
                let call = self.expr(call)?;
                self.writer.line(format!("{};", call));
                Ok(())
            }

            Statement::RuntimeCall(call) => self.emit_runtime_call(call),

            Statement::Exit => {
                let line = self.exit_line()?;
                self.writer.line(line);
                Ok(())
            }

            Statement::Continue => {
                for scope in self.scopes.iter().rev() {
                    match scope {
                        Scope::Loop { .. } => break,
                        Scope::Callable => {
                            return Err(self.unsupported(Construct::ContinueOutsideLoop));
                        }
                        Scope::Switch => {}
                    }
                }
                self.writer.line("continue;");
                Ok(())
            }

            Statement::Return => {
                let in_callable = self.scopes.iter().any(|s| matches!(s, Scope::Callable));
                let in_loop = self.scopes.iter().any(|s| matches!(s, Scope::Loop { .. }));
                if in_callable {
                    self.writer.line("return;");
                } else if in_loop {
                    return Err(self.unsupported(Construct::ReturnInsideLoop));
                } else if self.scopes.iter().any(|s| matches!(s, Scope::Switch)) {
                    return Err(self.unsupported(Construct::ExitFromTopLevelCase));
                } else {
                    self.writer.line("break;");
                }
                Ok(())
            }

            Statement::Comment(text) => {
                self.writer.line(format!("// {}", text));
                Ok(())
            }

            Statement::Unsupported(kind) => Err(self.unsupported(Construct::Statement(kind.clone()))),
        }
    }

    fn emit_data(&mut self, decl: &DataDeclaration) -> GenResult<()> {
        // a later DATA with the same name replaces the table entry
        let descriptor = match self.symbols.get(&decl.name) {
            Some(symbol) if symbol.position == self.position => symbol.descriptor.clone(),
            _ => SymbolTable::resolve(&decl.name, &decl.type_ref, self.position)?,
        };
        let Some(constructor) = descriptor.constructor() else {
            return Err(self.unsupported(Construct::Statement(StatementKind::Data)));
        };

        let mut options = Vec::new();
        if let Some(length) = &decl.options.length {
            options.push(format!("length: {}", self.expr(length)?));
        }
        if let Some(value) = &decl.options.value {
            options.push(format!("value: {}", self.expr(value)?));
        }

        let payload = if options.is_empty() {
            String::new()
        } else {
            format!("{{{}}}", options.join(", "))
        };
        self.writer.line(format!(
            "let {} = new abap.types.{}({});",
            decl.name, constructor, payload
        ));
        Ok(())
    }

    fn emit_case_body(&mut self, body: &Block) -> GenResult<()> {
        self.writer.indent_in();
        let result = self.emit_scoped(Scope::Switch, body);
        self.writer.line("break;");
        self.writer.indent_out();
        result
    }

    fn emit_loop(&mut self, header: String, body: &Block) -> GenResult<()> {
        let label = exits_through_switch(body, false).then(|| self.identifiers.next());
        match &label {
            Some(label) => self.writer.open(format!("{}: {}", label, header)),
            None => self.writer.open(header),
        }
        self.emit_scoped(Scope::Loop { label }, body)?;
        self.writer.close("}");
        Ok(())
    }

    /// `EXIT` leaves the innermost loop, or the FORM/METHOD when there is
    /// no loop. A plain `break` inside a `switch` would only leave the
    /// switch, so such loops are labeled.
    fn exit_line(&self) -> GenResult<String> {
        let mut crossed_switch = false;
        for scope in self.scopes.iter().rev() {
            match scope {
                Scope::Switch => crossed_switch = true,
                Scope::Loop { label } => {
                    return Ok(match label {
                        Some(label) if crossed_switch => format!("break {};", label),
                        _ => "break;".to_string(),
                    });
                }
                Scope::Callable => return Ok("return;".to_string()),
            }
        }
        if crossed_switch {
            return Err(self.unsupported(Construct::ExitFromTopLevelCase));
        }
        Ok("break;".to_string())
    }

    fn emit_runtime_call(&mut self, call: &RuntimeCall) -> GenResult<()> {
        let line = match call {
            RuntimeCall::Clear(target) => {
                format!("abap.statements.clear({});", self.expr(target)?)
            }
            RuntimeCall::Sort(target) => format!("abap.statements.sort({});", self.expr(target)?),
            RuntimeCall::Write(value) => format!("abap.statements.write({});", self.expr(value)?),
            RuntimeCall::Assert(condition) => {
                format!("abap.statements.assert({});", self.expr(condition)?)
            }
            RuntimeCall::Split { source, at, into } => {
                let SplitTarget::Table(target) = into else {
                    return Err(self.unsupported(Construct::SplitIntoFields));
                };
                format!(
                    "abap.statements.split({{source: {}, at: {}, target: {}}});",
                    self.expr(source)?,
                    self.expr(at)?,
                    self.expr(target)?
                )
            }
            RuntimeCall::DeleteWhere { table, condition } => format!(
                "abap.statements.deleteInternal({},() => {{return {};}});",
                self.expr(table)?,
                self.expr(condition)?
            ),
            RuntimeCall::Append { source, target } => format!(
                "abap.statements.append({{source: {}, target: {}}});",
                self.expr(source)?,
                self.expr(target)?
            ),
            RuntimeCall::Concatenate {
                sources,
                target,
                separated_by,
            } => {
                let sources = self.expr_list(sources)?;
                let mut options = vec![
                    format!("source: [{}]", sources),
                    format!("target: {}", self.expr(target)?),
                ];
                if let Some(separator) = separated_by {
                    options.push(format!("separatedBy: {}", self.expr(separator)?));
                }
                format!("abap.statements.concatenate({{{}}});", options.join(", "))
            }
        };
        self.writer.line(line);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------------

    /// Expression as a value object, or a boolean for conditions.
    fn expr(&self, expr: &Expr) -> GenResult<String> {
        match expr {
            Expr::Literal(literal) => Ok(literal_text(literal)),

            Expr::StringTemplate(segments) => {
                let mut out = String::from("`");
                for segment in segments {
                    match segment {
                        TemplateSegment::Literal(text) => out.push_str(&escape_template(text)),
                        TemplateSegment::Embedded(inner) => {
                            out.push_str("${");
                            out.push_str(&self.value(inner)?);
                            out.push('}');
                        }
                    }
                }
                out.push('`');
                Ok(out)
            }

            Expr::Identifier(name) => Ok(identifier_text(name)),

            Expr::MemberAccess { base, field } => Ok(format!("{}.{}", self.expr(base)?, field)),

            Expr::OffsetLengthAccess { .. } => Err(self.unsupported(Construct::OffsetLengthRead)),

            Expr::BinaryOp { op, left, right } => self.binary(*op, left, right),

            Expr::UnaryOp { op, operand } => match op {
                UnaryOp::Negate => Err(self.unsupported(Construct::Negation)),
                UnaryOp::Not => {
                    let inner = self.expr(operand)?;
                    if is_logical(operand) {
                        Ok(format!("!({})", inner))
                    } else {
                        Ok(format!("!{}", inner))
                    }
                }
                UnaryOp::IsInitial => Ok(format!("{}.initial()", self.receiver(operand)?)),
            },

            Expr::BuiltinCall { name, args } => {
                let args = match args {
                    CallArgs::Positional(values) => self.expr_list(values)?,
                    CallArgs::Named(pairs) => {
                        let fields = pairs
                            .iter()
                            .map(|(name, value)| {
                                Ok(format!("{}: {}", name.to_ascii_lowercase(), self.expr(value)?))
                            })
                            .collect::<GenResult<Vec<_>>>()?;
                        format!("{{{}}}", fields.join(", "))
                    }
                };
                Ok(format!("abap.builtin.{}({})", name.to_ascii_lowercase(), args))
            }

            Expr::MethodCall {
                receiver,
                method,
                args,
            } => {
                let receiver = self.receiver(receiver)?;
                let args = match args {
                    CallArgs::Positional(values) => self.expr_list(values)?,
                    CallArgs::Named(pairs) => self.ordered_args(&receiver, method, pairs)?,
                };
                Ok(format!("{}.{}({})", receiver, method, args))
            }
        }
    }

    fn binary(&self, op: BinOp, left: &Expr, right: &Expr) -> GenResult<String> {
        match op {
            BinOp::And => Ok(format!(
                "{} && {}",
                self.logical_operand(left, BinOp::Or)?,
                self.logical_operand(right, BinOp::Or)?
            )),
            BinOp::Or => Ok(format!("{} || {}", self.expr(left)?, self.expr(right)?)),
            _ => {
                // `2 + foo` → `foo.add(2)`, `0 < foo` → `foo.gt(0)`
                let (op, left, right) = match op.mirrored() {
                    Some(mirror) if left.is_literal() && !right.is_literal() => {
                        (mirror, right, left)
                    }
                    _ => (op, left, right),
                };
                let method = op.runtime_method().unwrap_or("eq");
                let call = format!("{}.{}({})", self.receiver(left)?, method, self.expr(right)?);
                if op == BinOp::NotEqual {
                    Ok(format!("!{}", call))
                } else {
                    Ok(call)
                }
            }
        }
    }

    /// Operand of `&&`, parenthesized when it is an `||`.
    fn logical_operand(&self, expr: &Expr, looser: BinOp) -> GenResult<String> {
        let text = self.expr(expr)?;
        match expr {
            Expr::BinaryOp { op, .. } if *op == looser => Ok(format!("({})", text)),
            _ => Ok(text),
        }
    }

    /// Left side of a method call; literals have no methods.
    fn receiver(&self, expr: &Expr) -> GenResult<String> {
        if expr.is_literal() {
            return Err(self.unsupported(Construct::LiteralReceiver));
        }
        let text = self.expr(expr)?;
        let needs_parens = is_logical(expr)
            || matches!(
                expr,
                Expr::BinaryOp {
                    op: BinOp::NotEqual,
                    ..
                } | Expr::UnaryOp {
                    op: UnaryOp::Not,
                    ..
                }
            );
        if needs_parens {
            Ok(format!("({})", text))
        } else {
            Ok(text)
        }
    }

    /// Plain value: literals as written, value objects through `get()`.
    fn value(&self, expr: &Expr) -> GenResult<String> {
        if expr.is_literal() {
            self.expr(expr)
        } else {
            Ok(format!("{}.get()", self.receiver(expr)?))
        }
    }

    fn expr_list(&self, values: &[Expr]) -> GenResult<String> {
        let parts = values
            .iter()
            .map(|value| self.expr(value))
            .collect::<GenResult<Vec<_>>>()?;
        Ok(parts.join(", "))
    }

    /// Named arguments in declared parameter order. Parameters without an
    /// argument in the middle become `undefined`; trailing ones are dropped.
    fn ordered_args(
        &self,
        receiver: &str,
        method: &str,
        pairs: &[(String, Expr)],
    ) -> GenResult<String> {
        let resolution_error = |reason: String| -> TranslateError {
            SignatureResolutionError {
                method: method.to_string(),
                reason,
                position: self.position,
            }
            .into()
        };

        let Some(order) = self.signatures.parameter_order(receiver, method) else {
            return Err(resolution_error("parameter order unknown".to_string()));
        };

        let mut slots: Vec<Option<String>> = vec![None; order.len()];
        for (name, value) in pairs {
            let index = order
                .iter()
                .position(|parameter| parameter.eq_ignore_ascii_case(name))
                .ok_or_else(|| resolution_error(format!("no parameter named '{}'", name)))?;
            if slots[index].is_some() {
                return Err(resolution_error(format!("parameter '{}' given twice", name)));
            }
            slots[index] = Some(self.expr(value)?);
        }

        while slots.last().is_some_and(|slot| slot.is_none()) {
            slots.pop();
        }

        Ok(slots
            .into_iter()
            .map(|slot| slot.unwrap_or_else(|| "undefined".to_string()))
            .collect::<Vec<_>>()
            .join(", "))
    }
}

fn literal_text(literal: &Literal) -> String {
    match literal {
        Literal::Number(n) => n.to_string(),
        Literal::Text(text) => quote_text(text),
        Literal::String(text) => format!("`{}`", escape_template(text)),
    }
}

fn identifier_text(name: &str) -> String {
    if name.eq_ignore_ascii_case("me") {
        "this".to_string()
    } else {
        name.to_string()
    }
}

fn is_logical(expr: &Expr) -> bool {
    matches!(expr, Expr::BinaryOp { op, .. } if op.is_logical())
}

/// True when an `EXIT` in `block` sits inside a `CASE` without a nested
/// loop in between.
fn exits_through_switch(block: &[Spanned<Statement>], in_switch: bool) -> bool {
    block.iter().any(|statement| match &statement.node {
        Statement::Exit => in_switch,
        Statement::If {
            branches,
            else_block,
        } => {
            branches
                .iter()
                .any(|branch| exits_through_switch(&branch.body, in_switch))
                || else_block
                    .as_ref()
                    .is_some_and(|block| exits_through_switch(block, in_switch))
        }
        Statement::Case { arms, default, .. } => {
            arms.iter().any(|arm| exits_through_switch(&arm.body, true))
                || default
                    .as_ref()
                    .is_some_and(|block| exits_through_switch(block, true))
        }
        _ => false,
    })
}

/// Generate JavaScript using the process-wide identifier counter and no
/// method signatures.
pub fn generate(
    statements: &[Spanned<Statement>],
    symbols: &SymbolTable,
) -> Result<String, TranslateError> {
    Generator::new(symbols, UniqueIdentifier::global(), &NoSignatures).run(statements)
}
