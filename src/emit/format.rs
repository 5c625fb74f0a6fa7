//! Text formatting utilities for LookML emission.
//!
//! Provides string quoting and indentation management.

/// Escape a string for use inside a double-quoted LookML string.
#[must_use]
pub fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            c => result.push(c),
        }
    }
    result
}

/// Quote a string literal with double quotes.
#[must_use]
pub fn quote_string(s: &str) -> String {
    format!("\"{}\"", escape_string(s))
}

/// LookML boolean.
#[must_use]
pub fn yes_no(b: bool) -> &'static str {
    if b {
        "yes"
    } else {
        "no"
    }
}

/// A writer that manages indentation for block-structured output.
pub struct IndentWriter {
    buffer: String,
    indent_str: String,
    current_indent: usize,
}

impl IndentWriter {
    /// Create a writer indenting by `width` spaces per level.
    #[must_use]
    pub fn new(width: usize) -> Self {
        Self {
            buffer: String::new(),
            indent_str: " ".repeat(width),
            current_indent: 0,
        }
    }

    /// Increase indentation level.
    pub fn indent(&mut self) {
        self.current_indent += 1;
    }

    /// Decrease indentation level.
    pub fn dedent(&mut self) {
        self.current_indent = self.current_indent.saturating_sub(1);
    }

    /// Write a complete line at the current indentation.
    ///
    /// Embedded newlines are written verbatim; continuation lines are not
    /// re-indented, so multi-line SQL keeps its own layout.
    pub fn write_line(&mut self, s: &str) {
        for _ in 0..self.current_indent {
            self.buffer.push_str(&self.indent_str);
        }
        self.buffer.push_str(s);
        self.buffer.push('\n');
    }

    /// Write `header {`, the block body one level deeper, then `}`.
    pub fn write_block(&mut self, header: &str, body: impl FnOnce(&mut Self)) {
        self.write_line(&format!("{header} {{"));
        self.indent();
        body(self);
        self.dedent();
        self.write_line("}");
    }

    /// Write a blank line.
    pub fn blank_line(&mut self) {
        self.buffer.push('\n');
    }

    /// Consume the writer and return the final string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.buffer
    }
}

impl Default for IndentWriter {
    fn default() -> Self {
        Self::new(2)
    }
}
