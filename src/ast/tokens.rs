use rust_decimal::Decimal;

use crate::lexer::Position;

/// A lexical token with its source text and location.
///
/// `spaced` records whether whitespace (or the start of the input) precedes
/// the token. ABAP gives meaning to adjacency: `foo-bar` is a component
/// access while `foo - bar` is a subtraction, and `foo(2)` is a length access
/// while `lines( foo )` is a call. The parser reads this flag to tell them
/// apart.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: Position,
    pub spaced: bool,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: Position, spaced: bool) -> Self {
        Token {
            kind,
            text: text.into(),
            position,
            spaced,
        }
    }

    /// True when this token can stand for a name.
    ///
    /// ABAP has no reserved words, so keywords double as identifiers
    /// wherever the grammar expects a name (`LOOP AT table INTO line`).
    pub fn is_name(&self) -> bool {
        matches!(self.kind, TokenKind::Identifier(_) | TokenKind::Keyword(_))
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Words
    /// Statement or clause keyword, matched case-insensitively
    ///
    /// # Examples
    /// ```text
    /// DATA
    /// endif
    /// Loop
    /// ```
    Keyword(Keyword),

    /// Name of a variable, type, form, class or method; casing preserved
    Identifier(String),

    // Literals
    /// Numeric literal
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 3.14
    /// ```
    Number(Decimal),

    /// Quoted character literal, `''` unescaped to `'`
    ///
    /// # Examples
    /// ```text
    /// 'fo'
    /// 'it''s'
    /// ```
    Quoted(String),

    /// String template with embedded expressions
    ///
    /// # Examples
    /// ```text
    /// |fo|
    /// |fo{ 2 }bar|
    /// ```
    Template(Vec<TemplatePart>),

    /// Backquoted string literal, no interpolation
    ///
    /// # Examples
    /// ```text
    /// `fo`
    /// ```
    Backquoted(String),

    /// Full-line `*` comment, text kept verbatim from the `*`
    Comment(String),

    // Comparison (symbolic and textual spellings fold together)
    /// `=` or `EQ`
    Eq,
    /// `<>` or `NE`
    Ne,
    /// `<` or `LT`
    Lt,
    /// `>` or `GT`
    Gt,
    /// `<=` or `LE`
    Le,
    /// `>=` or `GE`
    Ge,

    // Logical
    /// `NOT`
    Not,
    /// `AND`
    And,
    /// `OR`
    Or,

    // Arithmetic
    /// `+`, also the offset marker in `foo+1`
    Plus,
    /// `-`, also the component selector in `foo-bar`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `**`
    Power,
    /// `MOD`
    Mod,
    /// `DIV`
    Div,

    // Punctuation
    /// Instance method call `->`
    Arrow,
    /// Static method call `=>`
    FatArrow,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// Chain colon `:`
    Colon,
    /// Chain separator `,`
    Comma,
    /// Statement terminator `.`
    Period,

    /// End of input
    Eof,
}

/// One piece of a `|...|` template.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    /// Literal text with template escapes already resolved
    Literal(String),
    /// Tokens of an embedded `{ ... }` expression
    Embedded(Vec<Token>),
}

macro_rules! keywords {
    ($($variant:ident => $text:literal,)*) => {
        /// Keywords the parser dispatches on.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Keyword {
            $($variant,)*
        }

        impl Keyword {
            /// Looks a word up case-insensitively.
            pub fn from_word(word: &str) -> Option<Keyword> {
                match word.to_ascii_uppercase().as_str() {
                    $($text => Some(Keyword::$variant),)*
                    _ => None,
                }
            }

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Keyword::$variant => $text,)*
                }
            }
        }
    };
}

keywords! {
    Add => "ADD",
    Append => "APPEND",
    Assert => "ASSERT",
    At => "AT",
    By => "BY",
    Case => "CASE",
    Class => "CLASS",
    Clear => "CLEAR",
    Concatenate => "CONCATENATE",
    Continue => "CONTINUE",
    Data => "DATA",
    Deferred => "DEFERRED",
    Definition => "DEFINITION",
    Delete => "DELETE",
    Divide => "DIVIDE",
    Do => "DO",
    Else => "ELSE",
    ElseIf => "ELSEIF",
    EndCase => "ENDCASE",
    EndClass => "ENDCLASS",
    EndDo => "ENDDO",
    EndForm => "ENDFORM",
    EndIf => "ENDIF",
    EndLoop => "ENDLOOP",
    EndMethod => "ENDMETHOD",
    EndWhile => "ENDWHILE",
    Exit => "EXIT",
    Exporting => "EXPORTING",
    Form => "FORM",
    From => "FROM",
    Hashed => "HASHED",
    If => "IF",
    Implementation => "IMPLEMENTATION",
    Initial => "INITIAL",
    Into => "INTO",
    Is => "IS",
    Length => "LENGTH",
    Load => "LOAD",
    Loop => "LOOP",
    Method => "METHOD",
    Move => "MOVE",
    Multiply => "MULTIPLY",
    Of => "OF",
    Others => "OTHERS",
    Perform => "PERFORM",
    Ref => "REF",
    Return => "RETURN",
    Separated => "SEPARATED",
    Sort => "SORT",
    Sorted => "SORTED",
    Split => "SPLIT",
    Standard => "STANDARD",
    Subtract => "SUBTRACT",
    Table => "TABLE",
    Times => "TIMES",
    To => "TO",
    Type => "TYPE",
    Value => "VALUE",
    When => "WHEN",
    Where => "WHERE",
    While => "WHILE",
    With => "WITH",
    Write => "WRITE",
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Keyword(k) => write!(f, "keyword {}", k),
            TokenKind::Identifier(name) => write!(f, "identifier '{}'", name),
            TokenKind::Number(n) => write!(f, "number {}", n),
            TokenKind::Quoted(_) | TokenKind::Backquoted(_) => f.write_str("string literal"),
            TokenKind::Template(_) => f.write_str("string template"),
            TokenKind::Comment(_) => f.write_str("comment"),
            TokenKind::Eq => f.write_str("'='"),
            TokenKind::Ne => f.write_str("'<>'"),
            TokenKind::Lt => f.write_str("'<'"),
            TokenKind::Gt => f.write_str("'>'"),
            TokenKind::Le => f.write_str("'<='"),
            TokenKind::Ge => f.write_str("'>='"),
            TokenKind::Not => f.write_str("NOT"),
            TokenKind::And => f.write_str("AND"),
            TokenKind::Or => f.write_str("OR"),
            TokenKind::Plus => f.write_str("'+'"),
            TokenKind::Minus => f.write_str("'-'"),
            TokenKind::Star => f.write_str("'*'"),
            TokenKind::Slash => f.write_str("'/'"),
            TokenKind::Power => f.write_str("'**'"),
            TokenKind::Mod => f.write_str("MOD"),
            TokenKind::Div => f.write_str("DIV"),
            TokenKind::Arrow => f.write_str("'->'"),
            TokenKind::FatArrow => f.write_str("'=>'"),
            TokenKind::LParen => f.write_str("'('"),
            TokenKind::RParen => f.write_str("')'"),
            TokenKind::Colon => f.write_str("':'"),
            TokenKind::Comma => f.write_str("','"),
            TokenKind::Period => f.write_str("'.'"),
            TokenKind::Eof => f.write_str("end of input"),
        }
    }
}
