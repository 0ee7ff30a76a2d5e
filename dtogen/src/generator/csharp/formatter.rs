//! Line-oriented source buffer and C# literal escaping.

use crate::generator::traits::GeneratorConfig;
use crate::ir::DefaultLiteral;

/// Accumulates generated source with the configured indentation and line
/// endings.
#[derive(Debug)]
pub struct SourceBuffer<'c> {
    out: String,
    config: &'c GeneratorConfig,
    depth: usize,
}

impl<'c> SourceBuffer<'c> {
    pub fn new(config: &'c GeneratorConfig) -> Self {
        Self {
            out: String::new(),
            config,
            depth: 0,
        }
    }

    /// Append one line at the current depth. Empty text yields a blank line.
    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref();
        if !text.is_empty() {
            self.out.push_str(&self.config.indent.indent(self.depth));
            self.out.push_str(text);
        }
        self.out.push_str(self.config.line_ending.as_str());
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.line("")
    }

    /// Write `{` and indent.
    pub fn open(&mut self) -> &mut Self {
        self.line("{");
        self.depth += 1;
        self
    }

    /// Dedent and write `closing`, usually `}`.
    pub fn close_with(&mut self, closing: &str) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self.line(closing)
    }

    pub fn close(&mut self) -> &mut Self {
        self.close_with("}")
    }

    /// Configured header comment followed by a blank line.
    pub fn header(&mut self) -> &mut Self {
        let config = self.config;
        if let Some(header) = &config.header {
            for line in header.lines() {
                self.line(format!("// {}", line).trim_end());
            }
            self.blank();
        }
        self
    }

    /// `using` directives followed by a blank line.
    pub fn usings<'u>(&mut self, namespaces: impl IntoIterator<Item = &'u str>) -> &mut Self {
        let mut any = false;
        for namespace in namespaces {
            self.line(format!("using {};", namespace));
            any = true;
        }
        if any {
            self.blank();
        }
        self
    }

    /// XML `<summary>` block, when docs are enabled and there is text.
    pub fn summary(&mut self, text: Option<&str>) -> &mut Self {
        let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
            return self;
        };
        if !self.config.generate_docs {
            return self;
        }
        self.line("/// <summary>");
        for line in text.trim().lines() {
            self.line(format!("/// {}", escape_xml(line.trim_end())).trim_end());
        }
        self.line("/// </summary>")
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// Escape a string for use inside a C# regular string literal.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Escape text for an XML documentation comment.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// C# literal syntax of a default value.
///
/// Integers carry the `L` suffix so the boxed default matches a `long`
/// property; numbers always carry a decimal point or exponent.
pub fn default_literal(literal: &DefaultLiteral) -> String {
    match literal {
        DefaultLiteral::Integer(i) => format!("{}L", i),
        DefaultLiteral::Number(n) => {
            let text = format!("{:?}", n);
            if text.contains(['.', 'e', 'E']) {
                text
            } else {
                format!("{}.0", text)
            }
        }
        DefaultLiteral::Boolean(b) => b.to_string(),
        DefaultLiteral::String(s) => format!("\"{}\"", escape_string(s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::traits::{IndentStyle, LineEnding};

    #[test]
    fn test_buffer_indents_blocks() {
        let config = GeneratorConfig::default().with_header(None);
        let mut buf = SourceBuffer::new(&config);
        buf.line("namespace A").open().line("class B").open().close().close();
        assert_eq!(
            buf.finish(),
            "namespace A\n{\n    class B\n    {\n    }\n}\n"
        );
    }

    #[test]
    fn test_buffer_honors_style() {
        let config = GeneratorConfig::default()
            .with_header(Some("one\ntwo".to_string()))
            .with_indent(IndentStyle::Tabs)
            .with_line_ending(LineEnding::CrLf);
        let mut buf = SourceBuffer::new(&config);
        buf.header().open().line("x").close();
        assert_eq!(buf.finish(), "// one\r\n// two\r\n\r\n{\r\n\tx\r\n}\r\n");
    }

    #[test]
    fn test_summary_skipped_without_docs() {
        let config = GeneratorConfig::default().with_generate_docs(false);
        let mut buf = SourceBuffer::new(&config);
        buf.summary(Some("text"));
        assert_eq!(buf.finish(), "");

        let config = GeneratorConfig::default();
        let mut buf = SourceBuffer::new(&config);
        buf.summary(Some("a < b"));
        assert_eq!(buf.finish(), "/// <summary>\n/// a &lt; b\n/// </summary>\n");
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(escape_string("a\\b\nc"), "a\\\\b\\nc");
        assert_eq!(escape_string("\u{1}"), "\\u0001");
    }

    #[test]
    fn test_default_literals() {
        assert_eq!(default_literal(&DefaultLiteral::Integer(-3)), "-3L");
        assert_eq!(default_literal(&DefaultLiteral::Number(2.0)), "2.0");
        assert_eq!(default_literal(&DefaultLiteral::Number(0.5)), "0.5");
        assert_eq!(default_literal(&DefaultLiteral::Boolean(true)), "true");
        assert_eq!(
            default_literal(&DefaultLiteral::String("x\"y".to_string())),
            "\"x\\\"y\""
        );
    }
}
