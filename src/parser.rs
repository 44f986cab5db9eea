use std::mem;

use thiserror::Error;

use crate::{
    ast::{
        BinOp, Block, Branch, CallArgs, CaseArm, DataDeclaration, DataOptions, Expr, Keyword,
        Literal, RuntimeCall, Spanned, SplitTarget, Statement, StatementKind, TemplatePart,
        TemplateSegment, Token, TokenKind, TypeRef, UnaryOp,
    },
    error::TranslateError,
    lexer::Position,
    symbols::SymbolTable,
    transform::assignment_target,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Expected {expected}, found {found} at {position}")]
pub struct ParseError {
    pub position: Position,
    pub expected: String,
    pub found: String,
}

type ParseResult<T> = Result<T, TranslateError>;

/// Statements recognized as ABAP but not translated. They parse to
/// `Statement::Unsupported` and fail during code generation.
const UNSUPPORTED_KEYWORDS: &[&str] = &[
    "ASSIGN", "CALL", "CATCH", "CLEANUP", "COLLECT", "CONDENSE", "CONSTANTS", "CREATE", "ENDSELECT",
    "ENDTRY", "FIND", "FREE", "INCLUDE", "INSERT", "INTERFACE", "ENDINTERFACE", "MESSAGE",
    "MODIFY", "PARAMETERS", "PROGRAM", "RAISE", "RANGES", "READ", "REFRESH", "REPLACE", "REPORT",
    "SELECT", "SHIFT", "STATICS", "TRANSLATE", "TRY", "TYPES", "UNASSIGN",
];

/// Result of parsing a compilation unit.
#[derive(Debug, Clone)]
pub struct Program {
    pub statements: Block,
    pub symbols: SymbolTable,
}

/// Tokens of one period-terminated statement.
#[derive(Debug, Clone)]
struct Sentence {
    tokens: Vec<Token>,
    /// Where the statement starts; for a chain part, its own element
    start: Position,
    terminator: Position,
}

impl Sentence {
    fn position(&self) -> Position {
        self.start
    }

    fn starts_with(&self, keyword: Keyword) -> bool {
        self.tokens.first().is_some_and(|t| t.is_keyword(keyword))
    }
}

/// Splits the token stream at statement terminators.
///
/// Comment tokens always form their own statement. A comment that shows up
/// in the middle of a statement is moved in front of it.
fn split_sentences(tokens: Vec<Token>) -> ParseResult<Vec<Sentence>> {
    let mut sentences = Vec::new();
    let mut current: Vec<Token> = Vec::new();
    let mut hoisted: Vec<Sentence> = Vec::new();

    for token in tokens {
        match token.kind {
            TokenKind::Comment(_) => {
                let position = token.position;
                let sentence = Sentence {
                    tokens: vec![token],
                    start: position,
                    terminator: position,
                };
                if current.is_empty() {
                    sentences.push(sentence);
                } else {
                    hoisted.push(sentence);
                }
            }
            TokenKind::Period => {
                if let Some(start) = current.first().map(|t| t.position) {
                    sentences.append(&mut hoisted);
                    sentences.push(Sentence {
                        start,
                        tokens: mem::take(&mut current),
                        terminator: token.position,
                    });
                }
            }
            TokenKind::Eof => {
                if !current.is_empty() {
                    return Err(ParseError {
                        position: token.position,
                        expected: "'.'".to_string(),
                        found: "end of input".to_string(),
                    }
                    .into());
                }
                break;
            }
            _ => current.push(token),
        }
    }

    Ok(sentences)
}

/// Expands `KEYWORD: a, b.` into `KEYWORD a.` and `KEYWORD b.`
fn expand_chain(sentence: Sentence) -> ParseResult<Vec<Sentence>> {
    let colon = sentence
        .tokens
        .iter()
        .position(|t| t.kind == TokenKind::Colon);

    let Some(colon) = colon else {
        if let Some(comma) = sentence.tokens.iter().find(|t| t.kind == TokenKind::Comma) {
            return Err(ParseError {
                position: comma.position,
                expected: "':' before a chain".to_string(),
                found: "','".to_string(),
            }
            .into());
        }
        return Ok(vec![sentence]);
    };

    let prefix = &sentence.tokens[..colon];
    let rest = &sentence.tokens[colon + 1..];

    if let Some(extra) = rest.iter().find(|t| t.kind == TokenKind::Colon) {
        return Err(ParseError {
            position: extra.position,
            expected: "chain element".to_string(),
            found: "':'".to_string(),
        }
        .into());
    }

    let mut parts = Vec::new();
    for (i, group) in rest.split(|t| t.kind == TokenKind::Comma).enumerate() {
        if group.is_empty() {
            let found = if i == 0 && rest.is_empty() { "'.'" } else { "','" };
            return Err(ParseError {
                position: sentence.terminator,
                expected: "chain element".to_string(),
                found: found.to_string(),
            }
            .into());
        }
        let mut tokens = prefix.to_vec();
        tokens.extend(group.iter().cloned());
        // the first part starts at the chain keyword, later ones at their element
        let start = if i == 0 {
            sentence.start
        } else {
            group[0].position
        };
        parts.push(Sentence {
            tokens,
            start,
            terminator: sentence.terminator,
        });
    }
    Ok(parts)
}

/// What one statement contributes to the block structure.
#[derive(Debug)]
enum Step {
    Simple(Statement),
    Open(Opener),
    Middle(Middle),
    Close(Keyword),
}

#[derive(Debug)]
enum Opener {
    If(Expr),
    Case(Expr),
    Do(Option<Expr>),
    While(Expr),
    LoopAt { table: Expr, binding: String },
    Form(String),
    Class(String),
    ClassDefinition(String),
    Method(String),
}

#[derive(Debug)]
enum Middle {
    ElseIf(Expr),
    Else,
    When(Vec<Expr>),
    WhenOthers,
}

impl Middle {
    fn keyword(&self) -> Keyword {
        match self {
            Middle::ElseIf(_) => Keyword::ElseIf,
            Middle::Else => Keyword::Else,
            Middle::When(_) | Middle::WhenOthers => Keyword::When,
        }
    }
}

#[derive(Debug)]
enum ArmHead {
    Values(Vec<Expr>),
    Others,
}

/// Open block construct and the statements collected for it so far.
#[derive(Debug)]
struct Frame {
    position: Position,
    body: Block,
    state: FrameState,
}

#[derive(Debug)]
enum FrameState {
    If {
        branches: Vec<Branch>,
        // None once ELSE has been seen
        condition: Option<Expr>,
    },
    Case {
        selector: Expr,
        arms: Vec<CaseArm>,
        current: Option<ArmHead>,
        default: Option<Block>,
    },
    Do(Option<Expr>),
    While(Expr),
    LoopAt { table: Expr, binding: String },
    Form(String),
    Class(String),
    ClassDefinition(String),
    Method(String),
}

impl FrameState {
    fn closer(&self) -> Keyword {
        match self {
            FrameState::If { .. } => Keyword::EndIf,
            FrameState::Case { .. } => Keyword::EndCase,
            FrameState::Do(_) => Keyword::EndDo,
            FrameState::While(_) => Keyword::EndWhile,
            FrameState::LoopAt { .. } => Keyword::EndLoop,
            FrameState::Form(_) => Keyword::EndForm,
            FrameState::Class(_) | FrameState::ClassDefinition(_) => Keyword::EndClass,
            FrameState::Method(_) => Keyword::EndMethod,
        }
    }
}

impl Frame {
    fn open(opener: Opener, position: Position) -> Self {
        let state = match opener {
            Opener::If(condition) => FrameState::If {
                branches: Vec::new(),
                condition: Some(condition),
            },
            Opener::Case(selector) => FrameState::Case {
                selector,
                arms: Vec::new(),
                current: None,
                default: None,
            },
            Opener::Do(count) => FrameState::Do(count),
            Opener::While(condition) => FrameState::While(condition),
            Opener::LoopAt { table, binding } => FrameState::LoopAt { table, binding },
            Opener::Form(name) => FrameState::Form(name),
            Opener::Class(name) => FrameState::Class(name),
            Opener::ClassDefinition(name) => FrameState::ClassDefinition(name),
            Opener::Method(name) => FrameState::Method(name),
        };
        Frame {
            position,
            body: Vec::new(),
            state,
        }
    }

    /// Moves the collected body into the current CASE arm.
    fn flush_arm(&mut self) {
        if let FrameState::Case {
            arms,
            current,
            default,
            ..
        } = &mut self.state
        {
            let body = mem::take(&mut self.body);
            match current.take() {
                Some(ArmHead::Values(values)) => arms.push(CaseArm { values, body }),
                Some(ArmHead::Others) => *default = Some(body),
                None => self.body = body,
            }
        }
    }

    fn middle(&mut self, middle: Middle, position: Position) -> ParseResult<()> {
        let misplaced: TranslateError = ParseError {
            position,
            expected: self.state.closer().to_string(),
            found: middle.keyword().to_string(),
        }
        .into();

        match middle {
            Middle::ElseIf(_) | Middle::Else => {
                let FrameState::If {
                    branches,
                    condition,
                } = &mut self.state
                else {
                    return Err(misplaced);
                };
                // ELSE already seen
                let Some(done) = condition.take() else {
                    return Err(misplaced);
                };
                branches.push(Branch {
                    condition: done,
                    body: mem::take(&mut self.body),
                });
                if let Middle::ElseIf(next) = middle {
                    *condition = Some(next);
                }
                Ok(())
            }
            Middle::When(_) | Middle::WhenOthers => {
                match &self.state {
                    FrameState::Case {
                        current: Some(ArmHead::Others),
                        ..
                    } => return Err(misplaced),
                    FrameState::Case { .. } => {}
                    _ => return Err(misplaced),
                }
                self.flush_arm();
                let head = match middle {
                    Middle::When(values) => ArmHead::Values(values),
                    _ => ArmHead::Others,
                };
                if let FrameState::Case { current, .. } = &mut self.state {
                    *current = Some(head);
                }
                Ok(())
            }
        }
    }

    fn close(mut self) -> ParseResult<Statement> {
        let position = self.position;
        self.flush_arm();
        let statement = match self.state {
            FrameState::If {
                mut branches,
                condition,
            } => match condition {
                Some(condition) => {
                    branches.push(Branch {
                        condition,
                        body: self.body,
                    });
                    Statement::If {
                        branches,
                        else_block: None,
                    }
                }
                None => Statement::If {
                    branches,
                    else_block: Some(self.body),
                },
            },
            FrameState::Case {
                selector,
                arms,
                default,
                ..
            } => {
                if !self.body.is_empty() {
                    // comments with no WHEN to attach to
                    return Err(ParseError {
                        position,
                        expected: "WHEN".to_string(),
                        found: "ENDCASE".to_string(),
                    }
                    .into());
                }
                Statement::Case {
                    selector,
                    arms,
                    default,
                }
            }
            FrameState::Do(count) => Statement::Do {
                count,
                body: self.body,
            },
            FrameState::While(condition) => Statement::While {
                condition,
                body: self.body,
            },
            FrameState::LoopAt { table, binding } => Statement::LoopAt {
                table,
                binding,
                body: self.body,
            },
            FrameState::Form(name) => Statement::Form {
                name,
                body: self.body,
            },
            FrameState::Class(name) => Statement::ClassImplementation {
                name,
                methods: self.body,
            },
            FrameState::ClassDefinition(name) => Statement::ClassDefinition { name },
            FrameState::Method(name) => Statement::MethodDefinition {
                name,
                body: self.body,
            },
        };
        Ok(statement)
    }
}

/// Turns a token stream into statements and fills the symbol table.
///
/// # Examples
///
/// ```
/// use abap_js::lexer::tokenize;
/// use abap_js::parser::Parser;
/// use abap_js::ast::Statement;
///
/// let tokens = tokenize("DATA foo TYPE i. DO 5 TIMES. ENDDO.").unwrap();
/// let program = Parser::new(tokens).parse_program().unwrap();
///
/// assert_eq!(program.statements.len(), 2);
/// assert!(matches!(program.statements[1].node, Statement::Do { .. }));
/// assert_eq!(program.symbols.len(), 1);
/// ```
pub struct Parser {
    tokens: Vec<Token>,
    symbols: SymbolTable,
    frames: Vec<Frame>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            symbols: SymbolTable::new(),
            frames: Vec::new(),
        }
    }

    /// Parse a complete compilation unit.
    pub fn parse_program(mut self) -> Result<Program, TranslateError> {
        let sentences = split_sentences(mem::take(&mut self.tokens))?;
        let mut top: Block = Vec::new();

        for sentence in sentences {
            // class definitions are consumed without being parsed
            let skipping = matches!(
                self.frames.last(),
                Some(Frame {
                    state: FrameState::ClassDefinition(_),
                    ..
                })
            );
            if skipping && !sentence.starts_with(Keyword::EndClass) {
                continue;
            }

            for part in expand_chain(sentence)? {
                self.accept(part, &mut top)?;
            }
        }

        if let Some(frame) = self.frames.last() {
            return Err(ParseError {
                position: frame.position,
                expected: frame.state.closer().to_string(),
                found: "end of input".to_string(),
            }
            .into());
        }

        Ok(Program {
            statements: top,
            symbols: self.symbols,
        })
    }

    fn accept(&mut self, sentence: Sentence, top: &mut Block) -> ParseResult<()> {
        let position = sentence.position();
        let mut cursor = Cursor::new(&sentence.tokens, sentence.terminator, "'.'");

        match cursor.parse_statement()? {
            Step::Simple(statement) => {
                if let Statement::DataDeclaration(decl) = &statement {
                    self.symbols
                        .declare(&decl.name, &decl.type_ref, decl.options.clone(), position)?;
                }
                self.push(Spanned::new(statement, position), top)
            }
            Step::Open(opener) => {
                self.check_nesting(&opener, position)?;
                self.frames.push(Frame::open(opener, position));
                Ok(())
            }
            Step::Middle(middle) => match self.frames.last_mut() {
                Some(frame) => frame.middle(middle, position),
                None => Err(ParseError {
                    position,
                    expected: "statement".to_string(),
                    found: middle.keyword().to_string(),
                }
                .into()),
            },
            Step::Close(keyword) => {
                let Some(frame) = self.frames.pop() else {
                    return Err(ParseError {
                        position,
                        expected: "statement".to_string(),
                        found: keyword.to_string(),
                    }
                    .into());
                };
                let expected = frame.state.closer();
                if expected != keyword {
                    return Err(ParseError {
                        position,
                        expected: expected.to_string(),
                        found: keyword.to_string(),
                    }
                    .into());
                }
                let frame_position = frame.position;
                let statement = frame.close()?;
                self.push(Spanned::new(statement, frame_position), top)
            }
        }
    }

    /// FORM and CLASS only at top level, METHOD only directly inside a
    /// class implementation.
    fn check_nesting(&self, opener: &Opener, position: Position) -> ParseResult<()> {
        let (allowed, found) = match opener {
            Opener::Form(_) => (self.frames.is_empty(), "FORM"),
            Opener::Class(_) | Opener::ClassDefinition(_) => (self.frames.is_empty(), "CLASS"),
            Opener::Method(_) => (
                matches!(
                    self.frames.last(),
                    Some(Frame {
                        state: FrameState::Class(_),
                        ..
                    })
                ),
                "METHOD",
            ),
            _ => (true, ""),
        };

        if allowed {
            return Ok(());
        }

        let expected = match self.frames.last() {
            Some(frame) => frame.state.closer().to_string(),
            None => "CLASS ... IMPLEMENTATION".to_string(),
        };
        Err(ParseError {
            position,
            expected,
            found: found.to_string(),
        }
        .into())
    }

    fn push(&mut self, statement: Spanned<Statement>, top: &mut Block) -> ParseResult<()> {
        let Some(frame) = self.frames.last_mut() else {
            top.push(statement);
            return Ok(());
        };

        let is_comment = matches!(statement.node, Statement::Comment(_));
        match &frame.state {
            FrameState::Class(_)
                if !is_comment
                    && !matches!(statement.node, Statement::MethodDefinition { .. })
                    && !matches!(statement.node, Statement::Unsupported(_)) =>
            {
                return Err(ParseError {
                    position: statement.position,
                    expected: "METHOD".to_string(),
                    found: statement.node.kind().to_string(),
                }
                .into());
            }
            FrameState::Case { current: None, .. } if !is_comment => {
                return Err(ParseError {
                    position: statement.position,
                    expected: "WHEN".to_string(),
                    found: statement.node.kind().to_string(),
                }
                .into());
            }
            _ => {}
        }

        frame.body.push(statement);
        Ok(())
    }
}

/// Reads the tokens of a single statement or template expression.
struct Cursor<'t> {
    tokens: &'t [Token],
    index: usize,
    end: Position,
    end_text: &'static str,
}

impl<'t> Cursor<'t> {
    fn new(tokens: &'t [Token], end: Position, end_text: &'static str) -> Self {
        Cursor {
            tokens,
            index: 0,
            end,
            end_text,
        }
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.index)
    }

    fn peek_nth(&self, n: usize) -> Option<&'t Token> {
        self.tokens.get(self.index + n)
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.index);
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    fn at_end(&self) -> bool {
        self.index >= self.tokens.len()
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek().is_some_and(|t| &t.kind == kind)
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.peek().is_some_and(|t| t.is_keyword(keyword))
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        if self.check_keyword(keyword) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, expected: impl Into<String>) -> TranslateError {
        let (position, found) = match self.peek() {
            Some(token) => (token.position, token.kind.to_string()),
            None => (self.end, self.end_text.to_string()),
        };
        ParseError {
            position,
            expected: expected.into(),
            found,
        }
        .into()
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> ParseResult<()> {
        if self.eat(&kind) {
            Ok(())
        } else {
            Err(self.error(expected))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> ParseResult<()> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.error(keyword.as_str()))
        }
    }

    fn expect_name(&mut self, what: &str) -> ParseResult<String> {
        match self.peek() {
            Some(token) if token.is_name() => {
                self.index += 1;
                Ok(token.text.clone())
            }
            _ => Err(self.error(what)),
        }
    }

    fn expect_end(&self) -> ParseResult<()> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.error(self.end_text))
        }
    }
}

// ----------------------------------------------------------------------------
// Statements
// ----------------------------------------------------------------------------

impl<'t> Cursor<'t> {
    fn parse_statement(&mut self) -> ParseResult<Step> {
        let Some(first) = self.peek() else {
            return Err(self.error("statement"));
        };

        if let TokenKind::Comment(text) = &first.kind {
            return Ok(Step::Simple(Statement::Comment(text.clone())));
        }

        if self.looks_like_expression_statement() {
            return self.parse_expression_statement().map(Step::Simple);
        }

        let keyword = match &first.kind {
            TokenKind::Keyword(keyword) => *keyword,
            TokenKind::Identifier(word)
                if UNSUPPORTED_KEYWORDS.contains(&word.to_ascii_uppercase().as_str()) =>
            {
                return Ok(Step::Simple(Statement::Unsupported(StatementKind::Other(
                    word.to_ascii_uppercase(),
                ))));
            }
            _ => return self.parse_expression_statement().map(Step::Simple),
        };

        let step = match keyword {
            Keyword::Data => Step::Simple(self.parse_data()?),

            Keyword::If => {
                self.advance();
                Step::Open(Opener::If(self.parse_condition()?))
            }
            Keyword::ElseIf => {
                self.advance();
                Step::Middle(Middle::ElseIf(self.parse_condition()?))
            }
            Keyword::Else => {
                self.advance();
                Step::Middle(Middle::Else)
            }
            Keyword::Case => {
                self.advance();
                Step::Open(Opener::Case(self.parse_additive()?))
            }
            Keyword::When => {
                self.advance();
                if self.eat_keyword(Keyword::Others) {
                    Step::Middle(Middle::WhenOthers)
                } else {
                    let mut values = vec![self.parse_additive()?];
                    while self.eat(&TokenKind::Or) {
                        values.push(self.parse_additive()?);
                    }
                    Step::Middle(Middle::When(values))
                }
            }
            Keyword::Do => {
                self.advance();
                if self.at_end() {
                    Step::Open(Opener::Do(None))
                } else {
                    let count = self.parse_additive()?;
                    self.expect_keyword(Keyword::Times)?;
                    Step::Open(Opener::Do(Some(count)))
                }
            }
            Keyword::While => {
                self.advance();
                Step::Open(Opener::While(self.parse_condition()?))
            }
            Keyword::Loop => {
                self.advance();
                self.expect_keyword(Keyword::At)?;
                let table = self.parse_additive()?;
                self.expect_keyword(Keyword::Into)?;
                let binding = self.expect_name("loop variable")?;
                Step::Open(Opener::LoopAt { table, binding })
            }
            Keyword::Form => {
                self.advance();
                Step::Open(Opener::Form(self.expect_name("form name")?))
            }
            Keyword::Perform => {
                self.advance();
                let name = self.expect_name("form name")?;
                Step::Simple(Statement::Perform { name })
            }
            Keyword::Class => {
                self.advance();
                let name = self.expect_name("class name")?;
                if self.eat_keyword(Keyword::Implementation) {
                    Step::Open(Opener::Class(name))
                } else if self.eat_keyword(Keyword::Definition) {
                    // DEFERRED / LOAD forward declarations have no body
                    let forward = self.check_keyword(Keyword::Deferred)
                        || self.check_keyword(Keyword::Load);
                    self.index = self.tokens.len();
                    if forward {
                        Step::Simple(Statement::ClassDefinition { name })
                    } else {
                        Step::Open(Opener::ClassDefinition(name))
                    }
                } else {
                    return Err(self.error("IMPLEMENTATION or DEFINITION"));
                }
            }
            Keyword::Method => {
                self.advance();
                Step::Open(Opener::Method(self.expect_name("method name")?))
            }
            Keyword::EndIf
            | Keyword::EndCase
            | Keyword::EndDo
            | Keyword::EndWhile
            | Keyword::EndLoop
            | Keyword::EndForm
            | Keyword::EndClass
            | Keyword::EndMethod => {
                self.advance();
                Step::Close(keyword)
            }

            Keyword::Clear => {
                self.advance();
                Step::Simple(Statement::RuntimeCall(RuntimeCall::Clear(self.parse_additive()?)))
            }
            Keyword::Sort => {
                self.advance();
                Step::Simple(Statement::RuntimeCall(RuntimeCall::Sort(self.parse_additive()?)))
            }
            Keyword::Write => {
                self.advance();
                Step::Simple(Statement::RuntimeCall(RuntimeCall::Write(self.parse_additive()?)))
            }
            Keyword::Assert => {
                self.advance();
                Step::Simple(Statement::RuntimeCall(RuntimeCall::Assert(self.parse_condition()?)))
            }
            Keyword::Split => Step::Simple(self.parse_split()?),
            Keyword::Delete => {
                self.advance();
                let table = self.parse_additive()?;
                if self.eat_keyword(Keyword::Where) {
                    let condition = self.parse_condition()?;
                    Step::Simple(Statement::RuntimeCall(RuntimeCall::DeleteWhere {
                        table,
                        condition,
                    }))
                } else {
                    self.index = self.tokens.len();
                    Step::Simple(Statement::Unsupported(StatementKind::Delete))
                }
            }
            Keyword::Append => {
                self.advance();
                let source = self.parse_additive()?;
                self.expect_keyword(Keyword::To)?;
                let target = self.parse_target()?;
                Step::Simple(Statement::RuntimeCall(RuntimeCall::Append { source, target }))
            }
            Keyword::Concatenate => Step::Simple(self.parse_concatenate()?),

            Keyword::Add => {
                self.advance();
                let value = self.parse_additive()?;
                self.expect_keyword(Keyword::To)?;
                Step::Simple(self.parse_update(BinOp::Add, value)?)
            }
            Keyword::Subtract => {
                self.advance();
                let value = self.parse_additive()?;
                self.expect_keyword(Keyword::From)?;
                Step::Simple(self.parse_update(BinOp::Subtract, value)?)
            }
            Keyword::Multiply | Keyword::Divide => {
                self.advance();
                let target = self.parse_target()?;
                self.expect_keyword(Keyword::By)?;
                let value = self.parse_additive()?;
                let op = if keyword == Keyword::Multiply {
                    BinOp::Multiply
                } else {
                    BinOp::Divide
                };
                Step::Simple(Statement::Assignment {
                    value: Expr::binary(op, target.clone(), value),
                    target,
                })
            }
            Keyword::Move => {
                self.advance();
                let value = self.parse_additive()?;
                self.expect_keyword(Keyword::To)?;
                let target = self.parse_target()?;
                Step::Simple(Statement::Assignment { target, value })
            }

            Keyword::Exit => {
                self.advance();
                Step::Simple(Statement::Exit)
            }
            Keyword::Continue => {
                self.advance();
                Step::Simple(Statement::Continue)
            }
            Keyword::Return => {
                self.advance();
                Step::Simple(Statement::Return)
            }

            // a keyword used as a variable name
            _ => Step::Simple(self.parse_expression_statement()?),
        };

        self.expect_end()?;
        Ok(step)
    }

    /// `data = 1.`, `table->refresh( ).`, `length-field = 2.`: a leading
    /// keyword immediately used as a variable.
    fn looks_like_expression_statement(&self) -> bool {
        let (Some(first), Some(second)) = (self.peek(), self.peek_nth(1)) else {
            return false;
        };
        if !first.is_name() {
            return false;
        }
        match second.kind {
            TokenKind::Eq => second.spaced,
            TokenKind::Arrow | TokenKind::FatArrow => true,
            TokenKind::Minus | TokenKind::Plus | TokenKind::LParen => !second.spaced,
            _ => false,
        }
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Statement> {
        let target = self.parse_postfix()?;

        if self.eat(&TokenKind::Eq) {
            assignment_target(&target).map_err(|reason| self.error_at_start(reason.to_string()))?;
            let value = self.parse_expression()?;
            self.expect_end()?;
            return Ok(Statement::Assignment { target, value });
        }

        if matches!(target, Expr::MethodCall { .. }) {
            self.expect_end()?;
            return Ok(Statement::MethodCall(target));
        }

        Err(self.error("'=' or method call"))
    }

    fn error_at_start(&self, reason: String) -> TranslateError {
        let (position, found) = self
            .tokens
            .first()
            .map(|t| (t.position, t.kind.to_string()))
            .unwrap_or((self.end, self.end_text.to_string()));
        ParseError {
            position,
            expected: format!("assignment target ({})", reason),
            found,
        }
        .into()
    }

    fn parse_target(&mut self) -> ParseResult<Expr> {
        let target = self.parse_postfix()?;
        match assignment_target(&target) {
            Ok(_) => Ok(target),
            Err(reason) => Err(self.error_at_start(reason.to_string())),
        }
    }

    /// `ADD v TO t` and `SUBTRACT v FROM t` become `t = t op v`.
    fn parse_update(&mut self, op: BinOp, value: Expr) -> ParseResult<Statement> {
        let target = self.parse_target()?;
        Ok(Statement::Assignment {
            value: Expr::binary(op, target.clone(), value),
            target,
        })
    }

    fn parse_condition(&mut self) -> ParseResult<Expr> {
        if self.at_end() {
            return Err(self.error("condition"));
        }
        self.parse_expression()
    }

    fn parse_data(&mut self) -> ParseResult<Statement> {
        self.expect_keyword(Keyword::Data)?;
        let name = self.expect_name("variable name")?;
        let mut options = DataOptions::default();

        // legacy `DATA foo(2) TYPE c.`
        if self.peek().is_some_and(|t| t.kind == TokenKind::LParen && !t.spaced) {
            self.advance();
            options.length = Some(self.parse_section_operand("length")?);
            self.expect(TokenKind::RParen, "')'")?;
        }

        self.expect_keyword(Keyword::Type)?;
        let type_ref = self.parse_type_ref()?;

        loop {
            if self.eat_keyword(Keyword::Length) {
                options.length = Some(self.parse_section_operand("length")?);
            } else if self.eat_keyword(Keyword::Value) {
                if self.eat_keyword(Keyword::Is) {
                    self.expect_keyword(Keyword::Initial)?;
                } else {
                    options.value = Some(self.parse_unary()?);
                }
            } else {
                break;
            }
        }

        Ok(Statement::DataDeclaration(DataDeclaration {
            name,
            type_ref,
            options,
        }))
    }

    fn parse_type_ref(&mut self) -> ParseResult<TypeRef> {
        let table_kind = self.eat_keyword(Keyword::Standard)
            || self.eat_keyword(Keyword::Sorted)
            || self.eat_keyword(Keyword::Hashed);

        if table_kind || self.check_keyword(Keyword::Table) {
            self.expect_keyword(Keyword::Table)?;
            self.expect_keyword(Keyword::Of)?;
            let element = self.expect_name("table element type")?;
            if self.eat_keyword(Keyword::With) {
                // key definition does not affect the runtime object
                self.index = self.tokens.len();
            }
            return Ok(TypeRef::TableOf(element));
        }

        if self.eat_keyword(Keyword::Ref) {
            self.expect_keyword(Keyword::To)?;
            return Ok(TypeRef::RefTo(self.expect_name("class name")?));
        }

        Ok(TypeRef::Named(self.expect_name("type name")?))
    }

    fn parse_split(&mut self) -> ParseResult<Statement> {
        self.expect_keyword(Keyword::Split)?;
        let source = self.parse_additive()?;
        self.expect_keyword(Keyword::At)?;
        let at = self.parse_additive()?;
        self.expect_keyword(Keyword::Into)?;

        let into = if self.eat_keyword(Keyword::Table) {
            SplitTarget::Table(self.parse_target()?)
        } else {
            let mut fields = vec![self.parse_target()?];
            while !self.at_end() {
                fields.push(self.parse_target()?);
            }
            SplitTarget::Fields(fields)
        };

        Ok(Statement::RuntimeCall(RuntimeCall::Split { source, at, into }))
    }

    fn parse_concatenate(&mut self) -> ParseResult<Statement> {
        self.expect_keyword(Keyword::Concatenate)?;
        let mut sources = Vec::new();
        while !self.at_end() && !self.check_keyword(Keyword::Into) {
            sources.push(self.parse_additive()?);
        }
        if sources.is_empty() {
            return Err(self.error("expression"));
        }
        self.expect_keyword(Keyword::Into)?;
        let target = self.parse_target()?;

        let separated_by = if self.eat_keyword(Keyword::Separated) {
            self.expect_keyword(Keyword::By)?;
            Some(self.parse_additive()?)
        } else {
            None
        };

        Ok(Statement::RuntimeCall(RuntimeCall::Concatenate {
            sources,
            target,
            separated_by,
        }))
    }
}

// ----------------------------------------------------------------------------
// Expressions
// ----------------------------------------------------------------------------

impl<'t> Cursor<'t> {
    fn parse_expression(&mut self) -> ParseResult<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_and()?;
        while self.eat(&TokenKind::Or) {
            let right = self.parse_and()?;
            left = Expr::binary(BinOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_not()?;
        while self.eat(&TokenKind::And) {
            let right = self.parse_not()?;
            left = Expr::binary(BinOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> ParseResult<Expr> {
        if self.eat(&TokenKind::Not) {
            let operand = self.parse_not()?;
            return Ok(Expr::unary(UnaryOp::Not, operand));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> ParseResult<Expr> {
        let left = self.parse_additive()?;

        if self.eat_keyword(Keyword::Is) {
            let negated = self.eat(&TokenKind::Not);
            self.expect_keyword(Keyword::Initial)?;
            let test = Expr::unary(UnaryOp::IsInitial, left);
            return Ok(if negated {
                Expr::unary(UnaryOp::Not, test)
            } else {
                test
            });
        }

        let op = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Eq) => BinOp::Equal,
            Some(TokenKind::Ne) => BinOp::NotEqual,
            Some(TokenKind::Lt) => BinOp::LessThan,
            Some(TokenKind::Gt) => BinOp::GreaterThan,
            Some(TokenKind::Le) => BinOp::LessEqual,
            Some(TokenKind::Ge) => BinOp::GreaterEqual,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_additive()?;
        Ok(Expr::binary(op, left, right))
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.peek().map(|t| &t.kind) {
                Some(TokenKind::Plus) => BinOp::Add,
                Some(TokenKind::Minus) => BinOp::Subtract,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_power()?;

        loop {
            let op = match self.peek().map(|t| &t.kind) {
                Some(TokenKind::Star) => BinOp::Multiply,
                Some(TokenKind::Slash) => BinOp::Divide,
                Some(TokenKind::Mod) => BinOp::Modulo,
                Some(TokenKind::Div) => BinOp::IntDivide,
                _ => break,
            };
            self.advance();
            let right = self.parse_power()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_power(&mut self) -> ParseResult<Expr> {
        let base = self.parse_unary()?;
        if self.eat(&TokenKind::Power) {
            // right-associative
            let exponent = self.parse_power()?;
            return Ok(Expr::binary(BinOp::Power, base, exponent));
        }
        Ok(base)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        if self.eat(&TokenKind::Minus) {
            let operand = self.parse_unary()?;
            return Ok(match operand {
                Expr::Literal(Literal::Number(n)) => Expr::Literal(Literal::Number(-n)),
                other => Expr::unary(UnaryOp::Negate, other),
            });
        }
        self.parse_postfix()
    }

    /// Component, offset/length and method-call suffixes. They bind only
    /// when written without spaces (`foo-bar`, `foo+1(2)`).
    fn parse_postfix(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_primary()?;

        loop {
            let Some(token) = self.peek() else { break };
            let next = self.peek_nth(1);
            let joined_next = next.is_some_and(|n| !n.spaced);

            match token.kind {
                TokenKind::Minus
                    if !token.spaced
                        && joined_next
                        && next.is_some_and(|n| n.is_name())
                        && is_accessible(&expr) =>
                {
                    self.advance();
                    let field = self.expect_name("component name")?;
                    expr = Expr::MemberAccess {
                        base: Box::new(expr),
                        field,
                    };
                }
                TokenKind::Arrow | TokenKind::FatArrow if !token.spaced => {
                    self.advance();
                    let name = self.expect_name("method or attribute name")?;
                    if self.eat(&TokenKind::LParen) {
                        let args = self.parse_call_args()?;
                        expr = Expr::MethodCall {
                            receiver: Box::new(expr),
                            method: name,
                            args,
                        };
                    } else {
                        expr = Expr::MemberAccess {
                            base: Box::new(expr),
                            field: name,
                        };
                    }
                }
                TokenKind::Plus
                    if !token.spaced
                        && joined_next
                        && next.is_some_and(|n| {
                            n.is_name() || matches!(n.kind, TokenKind::Number(_))
                        })
                        && is_accessible(&expr) =>
                {
                    self.advance();
                    let offset = self.parse_section_operand("offset")?;
                    let length = self.parse_length_suffix()?;
                    expr = Expr::OffsetLengthAccess {
                        base: Box::new(expr),
                        offset: Some(Box::new(offset)),
                        length: length.map(Box::new),
                    };
                }
                TokenKind::LParen if !token.spaced && joined_next && is_accessible(&expr) => {
                    let length = self.parse_length_suffix()?;
                    expr = Expr::OffsetLengthAccess {
                        base: Box::new(expr),
                        offset: None,
                        length: length.map(Box::new),
                    };
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// Optional `(len)` directly after a name or offset.
    fn parse_length_suffix(&mut self) -> ParseResult<Option<Expr>> {
        let opens = self
            .peek()
            .is_some_and(|t| t.kind == TokenKind::LParen && !t.spaced)
            && self.peek_nth(1).is_some_and(|t| !t.spaced);
        if !opens {
            return Ok(None);
        }
        self.advance();
        let length = self.parse_section_operand("length")?;
        self.expect(TokenKind::RParen, "')'")?;
        Ok(Some(length))
    }

    /// A number or a name, as used in `+off(len)` and `LENGTH n`.
    fn parse_section_operand(&mut self, what: &str) -> ParseResult<Expr> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Number(n),
                ..
            }) => {
                let n = *n;
                self.advance();
                Ok(Expr::Literal(Literal::Number(n)))
            }
            Some(token) if token.is_name() => {
                self.advance();
                Ok(Expr::Identifier(token.text.clone()))
            }
            _ => Err(self.error(what)),
        }
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let Some(token) = self.peek() else {
            return Err(self.error("expression"));
        };

        match &token.kind {
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expr::Literal(Literal::Number(*n)))
            }
            TokenKind::Quoted(s) => {
                self.advance();
                Ok(Expr::Literal(Literal::Text(s.clone())))
            }
            TokenKind::Backquoted(s) => {
                self.advance();
                Ok(Expr::Literal(Literal::String(s.clone())))
            }
            TokenKind::Template(parts) => {
                self.advance();
                Ok(Expr::StringTemplate(self.parse_template(parts, token.position)?))
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(expr)
            }
            TokenKind::Identifier(_) | TokenKind::Keyword(_) => {
                self.advance();
                let name = token.text.clone();

                // `lines( x )` is a call, `foo(2)` is a length access
                let is_call = self
                    .peek()
                    .is_some_and(|t| t.kind == TokenKind::LParen && !t.spaced)
                    && self
                        .peek_nth(1)
                        .is_some_and(|t| t.spaced || t.kind == TokenKind::RParen);

                if is_call {
                    self.advance();
                    let args = self.parse_call_args()?;
                    return Ok(Expr::BuiltinCall { name, args });
                }
                Ok(Expr::Identifier(name))
            }
            _ => Err(self.error("expression")),
        }
    }

    fn parse_template(
        &self,
        parts: &[TemplatePart],
        position: Position,
    ) -> ParseResult<Vec<TemplateSegment>> {
        let mut segments = Vec::with_capacity(parts.len());
        for part in parts {
            match part {
                TemplatePart::Literal(text) => segments.push(TemplateSegment::Literal(text.clone())),
                TemplatePart::Embedded(tokens) => {
                    let end = tokens.last().map(|t| t.position).unwrap_or(position);
                    let mut nested = Cursor::new(tokens, end, "'}'");
                    let expr = nested.parse_expression()?;
                    nested.expect_end()?;
                    segments.push(TemplateSegment::Embedded(expr));
                }
            }
        }
        Ok(segments)
    }

    /// Arguments after an opening `(`, through the closing `)`.
    fn parse_call_args(&mut self) -> ParseResult<CallArgs> {
        if self.eat(&TokenKind::RParen) {
            return Ok(CallArgs::Positional(Vec::new()));
        }

        self.eat_keyword(Keyword::Exporting);

        if self.at_named_argument() {
            let mut named = Vec::new();
            loop {
                let name = self.expect_name("parameter name")?;
                self.expect(TokenKind::Eq, "'='")?;
                let value = self.parse_expression()?;
                named.push((name, value));

                if self.eat(&TokenKind::RParen) {
                    return Ok(CallArgs::Named(named));
                }
                if !self.at_named_argument() {
                    return Err(self.error("parameter name or ')'"));
                }
            }
        }

        let value = self.parse_expression()?;
        self.expect(TokenKind::RParen, "')'")?;
        Ok(CallArgs::Positional(vec![value]))
    }

    fn at_named_argument(&self) -> bool {
        self.peek().is_some_and(|t| t.is_name())
            && self.peek_nth(1).is_some_and(|t| t.kind == TokenKind::Eq)
    }
}

/// Expressions that may carry `-comp`, `+off` and `(len)` suffixes.
fn is_accessible(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Identifier(_) | Expr::MemberAccess { .. } | Expr::MethodCall { .. }
    )
}

/// Parse `tokens` into statements, filling a fresh symbol table.
pub fn parse(tokens: Vec<Token>) -> Result<Program, TranslateError> {
    Parser::new(tokens).parse_program()
}
