use std::fmt;

/// Runtime value-object type of a declared variable.
///
/// Every ABAP variable becomes a value object in the generated code. The
/// descriptor only decides which constructor a `DATA` statement emits;
/// reads, writes and arithmetic are the same for every type.
///
/// # Examples
///
/// ```
/// use abap_js::value::TypeDescriptor;
///
/// assert_eq!(TypeDescriptor::Integer.constructor(), Some("Integer"));
///
/// let table = TypeDescriptor::Table(Box::new(TypeDescriptor::String));
/// assert_eq!(table.constructor(), Some("Table"));
///
/// // Pseudo-fields such as `sy` can be read but never declared
/// assert_eq!(TypeDescriptor::Unknown.constructor(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    /// `TYPE i`
    Integer,

    /// `TYPE c`, optionally with `LENGTH n`
    Character,

    /// `TYPE string`
    String,

    /// `TYPE [STANDARD|SORTED|HASHED] TABLE OF element`
    Table(Box<TypeDescriptor>),

    /// Anything not declared in the compilation unit (pseudo-fields like
    /// `sy-subrc`, globals of other units)
    Unknown,
}

impl TypeDescriptor {
    /// Maps an elementary ABAP type keyword, case-insensitively.
    pub fn from_keyword(keyword: &str) -> Option<TypeDescriptor> {
        match keyword.to_ascii_lowercase().as_str() {
            "i" => Some(TypeDescriptor::Integer),
            "c" => Some(TypeDescriptor::Character),
            "string" => Some(TypeDescriptor::String),
            _ => None,
        }
    }

    /// Constructor name in `abap.types`, `None` for `Unknown`.
    pub fn constructor(&self) -> Option<&'static str> {
        match self {
            TypeDescriptor::Integer => Some("Integer"),
            TypeDescriptor::Character => Some("Character"),
            TypeDescriptor::String => Some("String"),
            TypeDescriptor::Table(_) => Some("Table"),
            TypeDescriptor::Unknown => None,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Integer => f.write_str("Integer"),
            TypeDescriptor::Character => f.write_str("Character"),
            TypeDescriptor::String => f.write_str("String"),
            TypeDescriptor::Table(element) => write!(f, "Table of {}", element),
            TypeDescriptor::Unknown => f.write_str("Unknown"),
        }
    }
}
