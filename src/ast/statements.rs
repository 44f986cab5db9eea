use std::fmt;

use crate::ast::Expr;
use crate::lexer::Position;

/// A node together with the position of its first token.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub position: Position,
}

impl<T> Spanned<T> {
    pub fn new(node: T, position: Position) -> Self {
        Spanned { node, position }
    }
}

/// Statements of a block, in source order.
pub type Block = Vec<Spanned<Statement>>;

/// One translated source statement.
///
/// Block constructs hold their bodies; the closing keyword has already been
/// matched when the node exists.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Variable declaration
    ///
    /// # Examples
    /// ```text
    /// DATA foo TYPE i.
    /// DATA foo TYPE c LENGTH 2 VALUE 'fo'.
    /// DATA foo TYPE STANDARD TABLE OF string.
    /// ```
    DataDeclaration(DataDeclaration),

    /// Value assignment, target is an identifier, member or offset/length access
    ///
    /// # Examples
    /// ```text
    /// foo = bar + 2.
    /// foo+1(1) = 'a'.
    /// ```
    Assignment { target: Expr, value: Expr },

    /// `IF` / `ELSEIF` / `ELSE` / `ENDIF`
    If {
        branches: Vec<Branch>,
        else_block: Option<Block>,
    },

    /// `CASE` / `WHEN` / `WHEN OTHERS` / `ENDCASE`
    Case {
        selector: Expr,
        arms: Vec<CaseArm>,
        default: Option<Block>,
    },

    /// `DO [n TIMES]` / `ENDDO`; no count means an open-ended loop
    Do { count: Option<Expr>, body: Block },

    /// `WHILE` / `ENDWHILE`
    While { condition: Expr, body: Block },

    /// `LOOP AT table INTO line` / `ENDLOOP`
    LoopAt {
        table: Expr,
        binding: String,
        body: Block,
    },

    /// `FORM name` / `ENDFORM`
    Form { name: String, body: Block },

    /// `PERFORM name`
    Perform { name: String },

    /// `CLASS name IMPLEMENTATION` / `ENDCLASS`, body holds only methods and comments
    ClassImplementation { name: String, methods: Block },

    /// `CLASS name DEFINITION`, contents are not translated
    ClassDefinition { name: String },

    /// `METHOD name` / `ENDMETHOD`
    MethodDefinition { name: String, body: Block },

    /// Method call used as a statement
    ///
    /// # Example
    /// ```text
    /// foo->method( 1 ).
    /// ```
    MethodCall(Expr),

    /// Statement forwarded to the runtime-support namespace
    RuntimeCall(RuntimeCall),

    Exit,
    Continue,
    Return,

    /// Full-line comment, kept verbatim
    Comment(String),

    /// Recognized statement the translator has no rule for
    Unsupported(StatementKind),
}

/// One `IF`/`ELSEIF` arm.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub condition: Expr,
    pub body: Block,
}

/// One `WHEN` arm; `WHEN a OR b` gives two values.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseArm {
    pub values: Vec<Expr>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataDeclaration {
    pub name: String,
    pub type_ref: TypeRef,
    pub options: DataOptions,
}

/// Type as written after `TYPE`.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    /// `TYPE i`, `TYPE string`
    Named(String),
    /// `TYPE [STANDARD|SORTED|HASHED] TABLE OF element`
    TableOf(String),
    /// `TYPE REF TO class`
    RefTo(String),
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => f.write_str(name),
            TypeRef::TableOf(element) => write!(f, "TABLE OF {}", element),
            TypeRef::RefTo(class) => write!(f, "REF TO {}", class),
        }
    }
}

/// `LENGTH` and `VALUE` additions of a declaration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataOptions {
    pub length: Option<Expr>,
    pub value: Option<Expr>,
}

impl DataOptions {
    pub fn is_empty(&self) -> bool {
        self.length.is_none() && self.value.is_none()
    }
}

/// Statements implemented by the runtime-support namespace.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeCall {
    Clear(Expr),
    Sort(Expr),
    Write(Expr),
    Assert(Expr),
    Split {
        source: Expr,
        at: Expr,
        into: SplitTarget,
    },
    DeleteWhere { table: Expr, condition: Expr },
    Append { source: Expr, target: Expr },
    Concatenate {
        sources: Vec<Expr>,
        target: Expr,
        separated_by: Option<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SplitTarget {
    /// `INTO TABLE itab`
    Table(Expr),
    /// `INTO a b c`
    Fields(Vec<Expr>),
}

/// Tag naming a statement kind, used in diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementKind {
    Data,
    Assignment,
    If,
    Case,
    Do,
    While,
    LoopAt,
    Form,
    Perform,
    ClassImplementation,
    ClassDefinition,
    Method,
    MethodCall,
    Clear,
    Sort,
    Write,
    Assert,
    Split,
    Delete,
    Append,
    Concatenate,
    Exit,
    Continue,
    Return,
    Comment,
    /// Any other statement, by its upper-cased leading keyword
    Other(String),
}

impl Statement {
    pub fn kind(&self) -> StatementKind {
        match self {
            Statement::DataDeclaration(_) => StatementKind::Data,
            Statement::Assignment { .. } => StatementKind::Assignment,
            Statement::If { .. } => StatementKind::If,
            Statement::Case { .. } => StatementKind::Case,
            Statement::Do { .. } => StatementKind::Do,
            Statement::While { .. } => StatementKind::While,
            Statement::LoopAt { .. } => StatementKind::LoopAt,
            Statement::Form { .. } => StatementKind::Form,
            Statement::Perform { .. } => StatementKind::Perform,
            Statement::ClassImplementation { .. } => StatementKind::ClassImplementation,
            Statement::ClassDefinition { .. } => StatementKind::ClassDefinition,
            Statement::MethodDefinition { .. } => StatementKind::Method,
            Statement::MethodCall(_) => StatementKind::MethodCall,
            Statement::RuntimeCall(call) => match call {
                RuntimeCall::Clear(_) => StatementKind::Clear,
                RuntimeCall::Sort(_) => StatementKind::Sort,
                RuntimeCall::Write(_) => StatementKind::Write,
                RuntimeCall::Assert(_) => StatementKind::Assert,
                RuntimeCall::Split { .. } => StatementKind::Split,
                RuntimeCall::DeleteWhere { .. } => StatementKind::Delete,
                RuntimeCall::Append { .. } => StatementKind::Append,
                RuntimeCall::Concatenate { .. } => StatementKind::Concatenate,
            },
            Statement::Exit => StatementKind::Exit,
            Statement::Continue => StatementKind::Continue,
            Statement::Return => StatementKind::Return,
            Statement::Comment(_) => StatementKind::Comment,
            Statement::Unsupported(kind) => kind.clone(),
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StatementKind::Data => "DATA",
            StatementKind::Assignment => "assignment",
            StatementKind::If => "IF",
            StatementKind::Case => "CASE",
            StatementKind::Do => "DO",
            StatementKind::While => "WHILE",
            StatementKind::LoopAt => "LOOP AT",
            StatementKind::Form => "FORM",
            StatementKind::Perform => "PERFORM",
            StatementKind::ClassImplementation => "CLASS IMPLEMENTATION",
            StatementKind::ClassDefinition => "CLASS DEFINITION",
            StatementKind::Method => "METHOD",
            StatementKind::MethodCall => "method call",
            StatementKind::Clear => "CLEAR",
            StatementKind::Sort => "SORT",
            StatementKind::Write => "WRITE",
            StatementKind::Assert => "ASSERT",
            StatementKind::Split => "SPLIT",
            StatementKind::Delete => "DELETE",
            StatementKind::Append => "APPEND",
            StatementKind::Concatenate => "CONCATENATE",
            StatementKind::Exit => "EXIT",
            StatementKind::Continue => "CONTINUE",
            StatementKind::Return => "RETURN",
            StatementKind::Comment => "comment",
            StatementKind::Other(keyword) => keyword,
        };
        f.write_str(text)
    }
}
