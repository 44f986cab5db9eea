//! Target text assembly for generated JavaScript.
//!
//! [`JsWriter`] collects output lines with two-space indentation per nesting
//! level and joins them with `\n`, without a trailing newline. The escape
//! helpers turn ABAP literal contents into JavaScript literal syntax.
//!
//! # Examples
//!
//! ```
//! use abap_js::output::JsWriter;
//!
//! let mut writer = JsWriter::new();
//! writer.open("if (foo.eq(bar)) {");
//! writer.line("foo.set(2);");
//! writer.close("}");
//!
//! assert_eq!(writer.finish(), "if (foo.eq(bar)) {\n  foo.set(2);\n}");
//! ```

#[derive(Debug, Default)]
pub struct JsWriter {
    lines: Vec<String>,
    depth: usize,
}

impl JsWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a line at the current depth.
    pub fn line(&mut self, text: impl AsRef<str>) {
        let line = format!("{}{}", self.indent(self.depth), text.as_ref());
        self.lines.push(line);
    }

    /// Appends a line and nests the following ones one level deeper.
    pub fn open(&mut self, text: impl AsRef<str>) {
        self.line(text);
        self.depth += 1;
    }

    /// Closes one level and appends the closing line.
    pub fn close(&mut self, text: impl AsRef<str>) {
        self.depth = self.depth.saturating_sub(1);
        self.line(text);
    }

    /// Closes one level and opens a sibling: `} else {`.
    pub fn reopen(&mut self, text: impl AsRef<str>) {
        self.depth = self.depth.saturating_sub(1);
        self.open(text);
    }

    pub fn indent_in(&mut self) {
        self.depth += 1;
    }

    pub fn indent_out(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn finish(self) -> String {
        self.lines.join("\n")
    }

    fn indent(&self, level: usize) -> String {
        "  ".repeat(level)
    }
}

/// `'...'` literal contents as a single-quoted JavaScript string.
pub fn quote_text(s: &str) -> String {
    format!("'{}'", escape(s, '\''))
}

/// Literal text as a JavaScript template literal body, without the
/// surrounding backquotes.
pub fn escape_template(s: &str) -> String {
    escape(s, '`')
}

fn escape(s: &str, delimiter: char) -> String {
    s.chars()
        .flat_map(|c| match c {
            '\\' => vec!['\\', '\\'],
            '\n' => vec!['\\', 'n'],
            '\r' => vec!['\\', 'r'],
            '\t' => vec!['\\', 't'],
            // `${` would start an interpolation
            '$' if delimiter == '`' => vec!['\\', '$'],
            c if c == delimiter => vec!['\\', c],
            c if c.is_control() => format!("\\u{:04x}", c as u32).chars().collect(),
            c => vec![c],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_indentation() {
        let mut writer = JsWriter::new();
        writer.open("function foo() {");
        writer.open("for (;;) {");
        writer.line("break;");
        writer.close("}");
        writer.close("}");
        assert_eq!(
            writer.finish(),
            "function foo() {\n  for (;;) {\n    break;\n  }\n}"
        );
    }

    #[test]
    fn test_reopen_keeps_depth() {
        let mut writer = JsWriter::new();
        writer.open("if (a) {");
        writer.reopen("} else {");
        writer.close("}");
        assert_eq!(writer.finish(), "if (a) {\n} else {\n}");
    }

    #[test]
    fn test_empty_writer() {
        assert_eq!(JsWriter::new().finish(), "");
    }

    #[test]
    fn test_quote_text() {
        assert_eq!(quote_text("fo"), "'fo'");
        assert_eq!(quote_text("it's"), r"'it\'s'");
        assert_eq!(quote_text(r"a\b"), r"'a\\b'");
    }

    #[test]
    fn test_escape_template() {
        assert_eq!(escape_template("a`b"), r"a\`b");
        assert_eq!(escape_template("${x}"), r"\${x}");
        assert_eq!(escape_template("line\nnext"), r"line\nnext");
        assert_eq!(escape_template("it's"), "it's");
    }
}
