//! Fresh names for identifiers the translation introduces, such as loop
//! counters and loop labels.

use std::sync::LazyLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use regex::Regex;

use crate::ast::{TemplatePart, Token, TokenKind};

/// Prefix of every generated name.
pub const RESERVED_PREFIX: &str = "unique";

static GLOBAL: UniqueIdentifier = UniqueIdentifier::new();

static RESERVED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)^{}\d+$", RESERVED_PREFIX)).expect("reserved name pattern")
});

/// Monotonic counter producing `unique1`, `unique2`, ...
///
/// Names are distinct for the lifetime of the counter. `reset` starts over at
/// `unique1`, which makes repeated independent translations reproducible.
/// One counter must not serve two compilations at the same time if their
/// output has to be deterministic; give each its own instance instead.
///
/// # Examples
///
/// ```
/// use abap_js::unique::UniqueIdentifier;
///
/// let ids = UniqueIdentifier::new();
/// assert_eq!(ids.next(), "unique1");
/// assert_eq!(ids.next(), "unique2");
///
/// ids.reset();
/// assert_eq!(ids.next(), "unique1");
/// ```
#[derive(Debug, Default)]
pub struct UniqueIdentifier {
    counter: AtomicUsize,
}

impl UniqueIdentifier {
    pub const fn new() -> Self {
        UniqueIdentifier {
            counter: AtomicUsize::new(0),
        }
    }

    /// The process-wide counter used by [`crate::translate`].
    pub fn global() -> &'static UniqueIdentifier {
        &GLOBAL
    }

    pub fn next(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{}", RESERVED_PREFIX, n)
    }

    pub fn reset(&self) {
        self.counter.store(0, Ordering::Relaxed);
    }
}

/// Source identifiers that look like generated names.
///
/// Nothing stops ABAP code from naming a variable `unique1`, in which case
/// it can clash with a generated loop counter. This lists such names so a
/// caller can warn about them.
pub fn reserved_collisions(tokens: &[Token]) -> Vec<String> {
    let mut found = Vec::new();
    collect_collisions(tokens, &mut found);
    found
}

fn collect_collisions(tokens: &[Token], found: &mut Vec<String>) {
    for token in tokens {
        match &token.kind {
            TokenKind::Identifier(name) if RESERVED_NAME.is_match(name) => {
                if !found.contains(name) {
                    found.push(name.clone());
                }
            }
            TokenKind::Template(parts) => {
                for part in parts {
                    if let TemplatePart::Embedded(nested) = part {
                        collect_collisions(nested, found);
                    }
                }
            }
            _ => {}
        }
    }
}
