use crate::core::domain::Language;
use crate::core::traits::TransportError;
use crate::core::traits::format::Formatter;

/// Local best-effort formatter used when the format backend is down:
/// strips trailing whitespace, collapses runs of blank lines and ensures a
/// final newline. Language-agnostic on purpose.
#[derive(Debug, Default, Clone)]
pub struct TidyFormatter;

impl TidyFormatter {
    pub fn new() -> Self {
        Self
    }

    fn tidy(code: &str) -> String {
        let mut out = String::with_capacity(code.len());
        let mut blank_streak = 0usize;
        for line in code.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                blank_streak += 1;
                if blank_streak > 1 {
                    continue;
                }
            } else {
                blank_streak = 0;
            }
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

#[async_trait::async_trait]
impl Formatter for TidyFormatter {
    async fn format(&self, code: &str, _language: Language) -> Result<String, TransportError> {
        Ok(Self::tidy(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_strips_trailing_whitespace_and_extra_blank_lines() {
        let formatter = TidyFormatter::new();
        let code = "def f():   \n    return 1\n\n\n\nprint(f())";

        let tidied = formatter.format(code, Language::Python).await.unwrap();

        assert_eq!(tidied, "def f():\n    return 1\n\nprint(f())\n");
    }

    #[tokio::test]
    async fn test_already_tidy_code_is_unchanged() {
        let formatter = TidyFormatter::new();
        let code = "int main() {\n    return 0;\n}\n";

        let tidied = formatter.format(code, Language::GnuCpp).await.unwrap();

        assert_eq!(tidied, code);
    }
}
