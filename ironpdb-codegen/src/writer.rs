//! Output sinks for code generation.
//!
//! [`IndentedWriter`] is a formatting sink: it tracks no state beyond the
//! indentation unit, callers pass the depth per line. [`ErrorLog`] collects
//! one line per recoverable mapping failure.

/// Indentation-aware text sink.
#[derive(Debug)]
pub struct IndentedWriter {
    output: String,
    unit: String,
}

impl Default for IndentedWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl IndentedWriter {
    /// Creates a writer using four-space indentation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: String::new(),
            unit: "    ".to_string(),
        }
    }

    /// Creates a writer with a custom indentation unit.
    #[must_use]
    pub fn with_unit(unit: impl Into<String>) -> Self {
        Self {
            output: String::new(),
            unit: unit.into(),
        }
    }

    /// Writes one line prefixed with `indentation` units of whitespace.
    pub fn write_line(&mut self, indentation: usize, line: &str) {
        for _ in 0..indentation {
            self.output.push_str(&self.unit);
        }
        self.output.push_str(line);
        self.output.push('\n');
    }

    /// Writes an empty line.
    pub fn blank_line(&mut self) {
        self.output.push('\n');
    }

    /// Appends already-formatted text verbatim.
    pub fn append_raw(&mut self, text: &str) {
        self.output.push_str(text);
    }

    /// Returns true if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    /// Returns the accumulated text.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.output
    }

    /// Returns the accumulated text without consuming the writer.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.output
    }
}

/// Sink for recoverable generation failures, one line per skipped member or
/// type.
#[derive(Debug, Default)]
pub struct ErrorLog {
    lines: Vec<String>,
}

impl ErrorLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one failure line.
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Returns the recorded lines.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Consumes the log and returns the recorded lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_line_indentation() {
        let mut writer = IndentedWriter::new();
        writer.write_line(0, "namespace Demo");
        writer.write_line(0, "{");
        writer.write_line(1, "public class Point");
        writer.write_line(1, "{");
        writer.write_line(2, "public int X;");
        writer.write_line(1, "}");
        writer.write_line(0, "}");

        let text = writer.into_inner();
        assert!(text.contains("\n    public class Point\n"));
        assert!(text.contains("\n        public int X;\n"));
    }

    #[test]
    fn test_custom_unit() {
        let mut writer = IndentedWriter::with_unit("\t");
        writer.write_line(2, "x");
        assert_eq!(writer.into_inner(), "\t\tx\n");
    }

    #[test]
    fn test_error_log() {
        let mut log = ErrorLog::new();
        assert!(log.is_empty());
        log.push("field 'x' skipped");
        assert_eq!(log.lines(), &["field 'x' skipped".to_string()]);
        assert_eq!(log.into_lines().len(), 1);
    }
}
