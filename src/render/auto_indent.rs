//! Indentation-tracking output sink for the renderer.
//!
//! The sink owns the output buffer and is the only place that writes
//! indentation. Callers push and pop indent levels around constructs;
//! the indent is materialized lazily, only when a non-empty line begins.
//! Three refinements keep the renderer simple:
//!
//! - **one-shot indents** apply to the next emitted line only,
//! - **next-line indents** are pushed before an opening bracket but take
//!   effect only after the following newline, so the bracket itself stays
//!   at the outer level,
//! - consecutive newlines collapse so the output never contains more than
//!   one blank line in a row.

/// Spaces per indent level for normal code.
pub const INDENT_DELTA: usize = 4;

/// Spaces per indent level inside `asm` blocks.
pub const ASM_INDENT_DELTA: usize = 2;

pub struct AutoIndentingStream {
    buffer: String,
    indent_delta: usize,
    indent_count: usize,
    indent_one_shot_count: usize,
    indent_next_line: usize,
    applied_indent: usize,
    current_line_empty: bool,
    trailing_newlines: usize,
}

impl AutoIndentingStream {
    pub fn new(indent_delta: usize) -> Self {
        AutoIndentingStream {
            buffer: String::new(),
            indent_delta,
            indent_count: 0,
            indent_one_shot_count: 0,
            indent_next_line: 0,
            applied_indent: 0,
            current_line_empty: true,
            // The start of the buffer counts as a fresh line with a blank
            // line above it, so nothing can insert leading newlines.
            trailing_newlines: 2,
        }
    }

    pub fn into_inner(self) -> String {
        self.buffer
    }

    /// Emit bytes, materializing the current indent if this starts a line.
    pub fn write_all(&mut self, bytes: &str) {
        if bytes.is_empty() {
            return;
        }
        self.apply_indent();
        self.write_no_indent(bytes);
    }

    fn write_no_indent(&mut self, bytes: &str) {
        self.buffer.push_str(bytes);
        for c in bytes.chars() {
            if c == '\n' {
                self.trailing_newlines += 1;
            } else {
                self.trailing_newlines = 0;
            }
        }
        if bytes.ends_with('\n') {
            self.current_line_empty = true;
            self.indent_next_line = 0;
        }
    }

    /// Newline at the current position. Collapses so that at most one
    /// blank line ever appears in the output.
    pub fn insert_newline(&mut self) {
        if self.trailing_newlines >= 2 {
            return;
        }
        self.write_no_indent("\n");
    }

    pub fn maybe_insert_newline(&mut self) {
        if !self.current_line_empty {
            self.insert_newline();
        }
    }

    pub fn push_indent(&mut self) {
        self.indent_count += 1;
    }

    /// Indent that is automatically popped after it is first applied.
    pub fn push_indent_one_shot(&mut self) {
        self.indent_one_shot_count += 1;
        self.push_indent();
    }

    /// Indent that does not take effect until the next line.
    pub fn push_indent_next_line(&mut self) {
        self.indent_next_line += 1;
        self.push_indent();
    }

    /// Turn pending one-shot indents into regular indents. Returns how
    /// many must now be popped manually.
    pub fn lock_one_shot_indent(&mut self) -> usize {
        let locked = self.indent_one_shot_count;
        self.indent_one_shot_count = 0;
        locked
    }

    pub fn pop_indent(&mut self) {
        debug_assert!(self.indent_count > 0);
        self.indent_count -= 1;
        if self.indent_next_line > 0 {
            self.indent_next_line -= 1;
        }
    }

    /// Change the spaces-per-level unit, preserving the current visual
    /// depth. The two deltas in use divide each other evenly.
    pub fn set_indent_delta(&mut self, new_delta: usize) {
        if self.indent_delta == new_delta {
            return;
        }
        if self.indent_delta > new_delta {
            debug_assert_eq!(self.indent_delta % new_delta, 0);
            self.indent_count *= self.indent_delta / new_delta;
        } else {
            debug_assert_eq!(new_delta % self.indent_delta, 0);
            self.indent_count /= new_delta / self.indent_delta;
        }
        self.indent_delta = new_delta;
    }

    fn apply_indent(&mut self) {
        let current_indent = self.current_indent();
        if self.current_line_empty && current_indent > 0 {
            for _ in 0..current_indent {
                self.buffer.push(' ');
            }
            self.trailing_newlines = 0;
        }
        self.indent_count -= self.indent_one_shot_count;
        self.indent_one_shot_count = 0;
        self.applied_indent = current_indent;
        self.current_line_empty = false;
    }

    fn current_indent(&self) -> usize {
        if self.indent_count == 0 {
            return 0;
        }
        let applicable = self.indent_count - self.indent_next_line;
        applicable * self.indent_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indents_are_applied_at_line_start() {
        let mut ais = AutoIndentingStream::new(4);
        ais.write_all("a {");
        ais.push_indent();
        ais.insert_newline();
        ais.write_all("b");
        ais.pop_indent();
        ais.insert_newline();
        ais.write_all("}");
        assert_eq!(ais.into_inner(), "a {\n    b\n}");
    }

    #[test]
    fn one_shot_indent_applies_once() {
        let mut ais = AutoIndentingStream::new(4);
        ais.write_all("x =");
        ais.push_indent_one_shot();
        ais.insert_newline();
        ais.write_all("value");
        ais.insert_newline();
        ais.write_all("next");
        assert_eq!(ais.into_inner(), "x =\n    value\nnext");
    }

    #[test]
    fn next_line_indent_skips_the_opener() {
        let mut ais = AutoIndentingStream::new(4);
        ais.push_indent_next_line();
        ais.write_all("{");
        ais.insert_newline();
        ais.write_all("body");
        ais.pop_indent();
        ais.insert_newline();
        ais.write_all("}");
        assert_eq!(ais.into_inner(), "{\n    body\n}");
    }

    #[test]
    fn newlines_collapse_to_one_blank_line() {
        let mut ais = AutoIndentingStream::new(4);
        ais.write_all("a");
        ais.insert_newline();
        ais.insert_newline();
        ais.insert_newline();
        ais.insert_newline();
        ais.write_all("b");
        assert_eq!(ais.into_inner(), "a\n\nb");
    }

    #[test]
    fn no_leading_newlines() {
        let mut ais = AutoIndentingStream::new(4);
        ais.insert_newline();
        ais.write_all("a");
        assert_eq!(ais.into_inner(), "a");
    }

    #[test]
    fn indent_delta_conversion_preserves_depth() {
        let mut ais = AutoIndentingStream::new(4);
        ais.write_all("a");
        ais.push_indent();
        ais.set_indent_delta(2);
        ais.insert_newline();
        ais.write_all("x");
        // One level of 4 becomes two levels of 2: same column.
        assert_eq!(ais.into_inner(), "a\n    x");
    }
}
