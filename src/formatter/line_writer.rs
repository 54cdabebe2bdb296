/// Indentation-aware line buffer.
///
/// Every line written through [`LineWriter::line`] is prefixed with one tab per
/// indentation level. Empty lines are never indented.
#[derive(Debug, Clone, Default)]
pub struct LineWriter {
    lines: Vec<String>,
    indent: usize,
}

impl LineWriter {
    const INDENT: &'static str = "\t";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines
                .push(format!("{}{}", Self::INDENT.repeat(self.indent), text));
        }
    }

    pub fn blank(&mut self) {
        self.lines.push(String::new());
    }

    /// Appends `text` to the last line, starting a new line if there is none.
    pub fn append(&mut self, text: impl AsRef<str>) {
        match self.lines.last_mut() {
            Some(last) => last.push_str(text.as_ref()),
            None => self.line(text),
        }
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Writes every line of `other` at the current indentation.
    pub fn import(&mut self, other: LineWriter) {
        for line in other.lines {
            self.line(line);
        }
    }

    /// Like [`import`](Self::import), but the first line of `other` continues
    /// the current last line.
    pub fn import_joined(&mut self, other: LineWriter) {
        let mut lines = other.lines.into_iter();

        if let Some(first) = lines.next() {
            self.append(first);
        }

        for line in lines {
            self.line(line);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn finish(self) -> String {
        self.lines.join("\n")
    }
}
