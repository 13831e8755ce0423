/// Line buffer for generated Liquid and JavaScript, with indentation
#[derive(Debug, Clone)]
pub struct Output {
    lines: Vec<String>,
    current_line: String,
    indent: usize,
    indent_unit: &'static str,
}

impl Output {
    pub fn new() -> Self {
        Self::with_indent("  ")
    }

    pub fn with_indent(indent_unit: &'static str) -> Self {
        Self {
            lines: Vec::new(),
            current_line: String::new(),
            indent: 0,
            indent_unit,
        }
    }

    /// Add text to the current line
    pub fn push(&mut self, text: &str) {
        if self.current_line.is_empty() && !text.is_empty() {
            self.current_line.push_str(&self.indent_unit.repeat(self.indent));
        }
        self.current_line.push_str(text);
    }

    /// Add a newline
    pub fn newline(&mut self) {
        self.current_line.push('\n');
        self.lines.push(std::mem::take(&mut self.current_line));
    }

    /// Add a full line at the current indentation
    pub fn line(&mut self, text: &str) {
        self.push(text);
        self.newline();
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Finish and return the generated code
    pub fn finish(mut self) -> String {
        // No trailing newline for last line
        if !self.current_line.is_empty() {
            self.lines.push(std::mem::take(&mut self.current_line));
        }
        self.lines.join("")
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
