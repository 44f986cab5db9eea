use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::ast::{Keyword, TemplatePart, Token, TokenKind};

/// 1-based line and column of a character in the source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Errors raised while turning source text into tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("Unterminated {what} starting at {position}")]
    Unterminated {
        what: &'static str,
        position: Position,
    },

    #[error("Unexpected character '{character}' at {position}")]
    UnexpectedCharacter { character: char, position: Position },

    #[error("Invalid number '{literal}' at {position}")]
    InvalidNumber { literal: String, position: Position },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::Unterminated { position, .. }
            | LexError::UnexpectedCharacter { position, .. }
            | LexError::InvalidNumber { position, .. } => *position,
        }
    }
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    // only whitespace seen since the last newline
    line_start: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            line_start: true,
        }
    }

    /// Lexer for a template payload that starts at `origin` in the
    /// enclosing source, so nested tokens report real positions.
    fn with_origin(input: &str, origin: Position) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            line: origin.line,
            column: origin.column,
            line_start: false,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn here(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.position += 1;
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
                self.line_start = true;
            } else {
                self.column += 1;
            }
        }
    }

    /// Skips whitespace and `"` comments, reporting whether anything was skipped.
    fn skip_trivia(&mut self) -> bool {
        let mut skipped = false;
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else if ch == '"' {
                while self.current_char().is_some_and(|c| c != '\n') {
                    self.advance();
                }
            } else {
                break;
            }
            skipped = true;
        }
        skipped
    }

    fn text_from(&self, start: usize) -> String {
        self.input[start..self.position].iter().collect()
    }

    fn read_word(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_comment(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch == '\n' {
                break;
            }
            result.push(ch);
            self.advance();
        }
        result.trim_end().to_string()
    }

    /// Reads a `'...'` or `` `...` `` literal; a doubled delimiter is an escaped delimiter.
    fn read_delimited(&mut self, quote: char, what: &'static str) -> Result<String, LexError> {
        let start = self.here();
        let mut result = String::new();
        self.advance(); // opening quote

        loop {
            match self.current_char() {
                None | Some('\n') => {
                    return Err(LexError::Unterminated {
                        what,
                        position: start,
                    });
                }
                Some(c) if c == quote => {
                    if self.peek_char(1) == Some(quote) {
                        result.push(quote);
                        self.advance();
                        self.advance();
                    } else {
                        self.advance();
                        return Ok(result);
                    }
                }
                Some(c) => {
                    result.push(c);
                    self.advance();
                }
            }
        }
    }

    fn read_template(&mut self) -> Result<Vec<TemplatePart>, LexError> {
        let start = self.here();
        let unterminated = LexError::Unterminated {
            what: "string template",
            position: start,
        };
        let mut parts = Vec::new();
        let mut literal = String::new();
        self.advance(); // opening '|'

        loop {
            match self.current_char() {
                None | Some('\n') => return Err(unterminated),
                Some('|') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    let escaped = match self.current_char() {
                        None | Some('\n') => return Err(unterminated),
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some(c) => c,
                    };
                    literal.push(escaped);
                    self.advance();
                }
                Some('{') => {
                    if !literal.is_empty() {
                        parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
                    }
                    parts.push(TemplatePart::Embedded(self.read_embedded()?));
                }
                Some('}') => {
                    return Err(LexError::UnexpectedCharacter {
                        character: '}',
                        position: self.here(),
                    });
                }
                Some(c) => {
                    literal.push(c);
                    self.advance();
                }
            }
        }

        if !literal.is_empty() {
            parts.push(TemplatePart::Literal(literal));
        }
        Ok(parts)
    }

    /// Reads a `{ ... }` payload and tokenizes it recursively.
    fn read_embedded(&mut self) -> Result<Vec<Token>, LexError> {
        let start = self.here();
        self.advance(); // '{'
        let origin = self.here();
        let mut payload = String::new();
        let mut depth = 0usize;
        let mut quote: Option<char> = None;

        loop {
            let ch = match self.current_char() {
                None | Some('\n') => {
                    return Err(LexError::Unterminated {
                        what: "embedded expression",
                        position: start,
                    });
                }
                Some(ch) => ch,
            };

            match quote {
                Some(q) if ch == q => quote = None,
                Some(_) => {}
                None => match ch {
                    '\'' | '`' | '|' => quote = Some(ch),
                    '{' => depth += 1,
                    '}' if depth == 0 => {
                        self.advance();
                        break;
                    }
                    '}' => depth -= 1,
                    _ => {}
                },
            }
            payload.push(ch);
            self.advance();
        }

        let mut nested = Lexer::with_origin(&payload, origin);
        let mut tokens = nested.tokenize()?;
        tokens.pop(); // Eof
        Ok(tokens)
    }

    fn read_number(&mut self) -> Result<TokenKind, LexError> {
        let start = self.here();
        let mut number = String::new();
        let mut is_decimal = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_decimal
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_decimal = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Decimal::from_str(&number)
            .map(TokenKind::Number)
            .map_err(|_| LexError::InvalidNumber {
                literal: number,
                position: start,
            })
    }

    fn classify_word(word: &str) -> TokenKind {
        match word.to_ascii_uppercase().as_str() {
            "EQ" => TokenKind::Eq,
            "NE" => TokenKind::Ne,
            "LT" => TokenKind::Lt,
            "GT" => TokenKind::Gt,
            "LE" => TokenKind::Le,
            "GE" => TokenKind::Ge,
            "NOT" => TokenKind::Not,
            "AND" => TokenKind::And,
            "OR" => TokenKind::Or,
            "MOD" => TokenKind::Mod,
            "DIV" => TokenKind::Div,
            _ => match Keyword::from_word(word) {
                Some(keyword) => TokenKind::Keyword(keyword),
                None => TokenKind::Identifier(word.to_string()),
            },
        }
    }

    /// Consumes `len` characters and yields `kind`.
    fn punct(&mut self, kind: TokenKind, len: usize) -> TokenKind {
        for _ in 0..len {
            self.advance();
        }
        kind
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        let spaced = self.skip_trivia() || self.position == 0;
        let position = self.here();
        let start = self.position;

        let Some(ch) = self.current_char() else {
            return Ok(Token::new(TokenKind::Eof, "", position, spaced));
        };

        if ch == '*' && self.line_start {
            let text = self.read_comment();
            return Ok(Token::new(TokenKind::Comment(text.clone()), text, position, spaced));
        }
        self.line_start = false;

        let kind = match ch {
            '\'' => TokenKind::Quoted(self.read_delimited('\'', "character literal")?),
            '`' => TokenKind::Backquoted(self.read_delimited('`', "string literal")?),
            '|' => TokenKind::Template(self.read_template()?),
            c if c.is_ascii_digit() => self.read_number()?,
            c if c.is_alphabetic() || c == '_' => {
                let word = self.read_word();
                Self::classify_word(&word)
            }
            '=' if self.peek_char(1) == Some('>') => self.punct(TokenKind::FatArrow, 2),
            '=' => self.punct(TokenKind::Eq, 1),
            '<' if self.peek_char(1) == Some('>') => self.punct(TokenKind::Ne, 2),
            '<' if self.peek_char(1) == Some('=') => self.punct(TokenKind::Le, 2),
            '<' => self.punct(TokenKind::Lt, 1),
            '>' if self.peek_char(1) == Some('=') => self.punct(TokenKind::Ge, 2),
            '>' => self.punct(TokenKind::Gt, 1),
            '-' if self.peek_char(1) == Some('>') => self.punct(TokenKind::Arrow, 2),
            '-' => self.punct(TokenKind::Minus, 1),
            '+' => self.punct(TokenKind::Plus, 1),
            '*' if self.peek_char(1) == Some('*') => self.punct(TokenKind::Power, 2),
            '*' => self.punct(TokenKind::Star, 1),
            '/' => self.punct(TokenKind::Slash, 1),
            '(' => self.punct(TokenKind::LParen, 1),
            ')' => self.punct(TokenKind::RParen, 1),
            ':' => self.punct(TokenKind::Colon, 1),
            ',' => self.punct(TokenKind::Comma, 1),
            '.' => self.punct(TokenKind::Period, 1),
            other => {
                return Err(LexError::UnexpectedCharacter {
                    character: other,
                    position,
                });
            }
        };

        Ok(Token::new(kind, self.text_from(start), position, spaced))
    }

    /// Tokenizes the whole input; the last token is always `Eof`.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }
}

/// Tokenizes `source`; the last token is always `Eof`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).tokenize()
}

#[test]
fn test_operator_aliases() {
    let mut lexer = Lexer::new("eq NE Lt gt LE ge not AND or");
    let expected = [
        TokenKind::Eq,
        TokenKind::Ne,
        TokenKind::Lt,
        TokenKind::Gt,
        TokenKind::Le,
        TokenKind::Ge,
        TokenKind::Not,
        TokenKind::And,
        TokenKind::Or,
    ];
    for kind in expected {
        assert_eq!(lexer.next_token().unwrap().kind, kind);
    }
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
}

#[test]
fn test_member_access_is_not_spaced() {
    let tokens = tokenize("sy-subrc").unwrap();
    assert_eq!(tokens[0].kind, TokenKind::Identifier("sy".into()));
    assert_eq!(tokens[1].kind, TokenKind::Minus);
    assert!(!tokens[1].spaced);
    assert!(!tokens[2].spaced);
}
