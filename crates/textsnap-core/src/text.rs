use textsnap_config::output::OutputConfig;
use unicode_normalization::UnicodeNormalization;

/// Cleanup applied to recognised text before it is delivered.
pub trait Postprocessor {
    fn remove_empty_lines(&self) -> bool {
        false
    }

    fn process(&self, text: &str) -> String {
        // Composed form so clipboard and translation see the same code points
        let text: String = text.nfc().collect();

        if !self.remove_empty_lines() {
            return text;
        }

        text.lines()
            .filter(|line| !line.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultPostprocessor {
    remove_empty_lines: bool,
}

impl DefaultPostprocessor {
    pub fn new(remove_empty_lines: bool) -> Self {
        Self { remove_empty_lines }
    }

    pub fn from_config(output: &OutputConfig) -> Self {
        Self::new(output.remove_empty_lines)
    }
}

impl Postprocessor for DefaultPostprocessor {
    fn remove_empty_lines(&self) -> bool {
        self.remove_empty_lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blank_lines_removed() {
        let processor = DefaultPostprocessor::new(true);
        assert_eq!(processor.process("a\n\n  \nb"), "a\nb");
    }

    #[test]
    fn test_blank_lines_kept_by_default() {
        let processor = DefaultPostprocessor::default();
        assert_eq!(processor.process("a\n\nb\n"), "a\n\nb\n");
    }

    #[test]
    fn test_text_is_composed() {
        let processor = DefaultPostprocessor::default();
        // "e" + combining acute
        assert_eq!(processor.process("caf\u{0065}\u{0301}"), "caf\u{00e9}");
    }

    #[test]
    fn test_all_blank_input_becomes_empty() {
        let processor = DefaultPostprocessor::new(true);
        assert_eq!(processor.process("\n \n\t\n"), "");
    }
}
