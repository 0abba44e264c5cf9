use std::collections::HashSet;

/// Ratio of distinct whitespace tokens to the word count of a text.
#[derive(Debug, Clone, Copy)]
pub struct LexicalDiversity {
    threshold: f64,
}

impl LexicalDiversity {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    /// Empty text counts as one unique token over one word, so the ratio is 1.0.
    pub fn ratio(&self, text: &str, word_count: usize) -> f64 {
        let unique = text.split_whitespace().collect::<HashSet<_>>().len().max(1);
        unique as f64 / word_count.max(1) as f64
    }

    pub fn is_diverse(&self, text: &str, word_count: usize) -> bool {
        self.ratio(text, word_count) >= self.threshold
    }
}

impl Default for LexicalDiversity {
    fn default() -> Self {
        Self::new(0.8)
    }
}
