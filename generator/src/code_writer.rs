//! Indented C# text output

const INDENT: &str = "    ";

/// Accumulates generated C# one line at a time.
///
/// Lines are written at the current indentation level; `open_block` and
/// `close_block` write braces on their own lines and move the level.
#[derive(Debug, Default)]
pub struct CodeWriter {
    buffer: String,
    indent_level: usize,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one line; an empty line gets no indentation
    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref();
        if !text.is_empty() {
            self.write_indent();
            self.buffer.push_str(text);
        }
        self.buffer.push('\n');
        self
    }

    pub fn blank_line(&mut self) -> &mut Self {
        self.buffer.push('\n');
        self
    }

    /// `header`, then `{` on the next line, then indent
    pub fn open_block(&mut self, header: impl AsRef<str>) -> &mut Self {
        self.line(header);
        self.line("{");
        self.increase_indent();
        self
    }

    pub fn close_block(&mut self) -> &mut Self {
        self.close_block_with("")
    }

    /// Close a block with text after the brace, e.g. `};`
    pub fn close_block_with(&mut self, suffix: &str) -> &mut Self {
        self.decrease_indent();
        self.write_indent();
        self.buffer.push('}');
        self.buffer.push_str(suffix);
        self.buffer.push('\n');
        self
    }

    pub fn increase_indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn decrease_indent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    pub fn indent_level(&self) -> usize {
        self.indent_level
    }

    pub fn finish(self) -> String {
        self.buffer
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.buffer.push_str(INDENT);
        }
    }
}
