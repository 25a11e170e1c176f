/// Filler phrases and bracketed emoji markers that carry no topic signal in short-video comments.
pub const DEFAULT_IRRELEVANT_PATTERNS: &[&str] = &[
    "捂脸", "笑哭", "点赞", "哈哈哈", "赞", "表情",
    "[九转大肠]", "[比心]", "[玫瑰]", "[看]", "[感谢]", "[发怒]",
    "给你点一百个赞", "强烈建议恢复八抬大轿", "抠鼻", "呲牙",
];

#[derive(Debug, Clone)]
pub struct Normalizer {
    irrelevant_patterns: Vec<String>,
}

impl Normalizer {
    pub fn new(irrelevant_patterns: Vec<String>) -> Self {
        Self {
            irrelevant_patterns: irrelevant_patterns.into_iter().filter(|v| !v.is_empty()).collect(),
        }
    }

    /// Removes non-word characters and irrelevant patterns.
    ///
    /// Patterns are deleted before punctuation is stripped, so bracketed markers
    /// like `[比心]` still match, and once more afterwards. Each deletion pass is
    /// repeated until nothing changes, which keeps the result stable under
    /// re-normalization even when a deletion joins two halves of another pattern.
    pub fn normalize(&self, text: &str) -> String {
        let text = self.strip_patterns(text.to_owned());
        let text: String = text.chars().filter(|c| is_word_char(*c)).collect();
        self.strip_patterns(text)
    }

    fn strip_patterns(&self, mut text: String) -> String {
        loop {
            let before = text.len();
            for pattern in &self.irrelevant_patterns {
                if text.contains(pattern.as_str()) {
                    text = text.replace(pattern.as_str(), "");
                }
            }
            if text.len() == before {
                return text;
            }
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_IRRELEVANT_PATTERNS.iter().map(|v| v.to_string()).collect())
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c.is_whitespace()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer(patterns: &[&str]) -> Normalizer {
        Normalizer::new(patterns.iter().map(|v| v.to_string()).collect())
    }

    #[test]
    fn strips_punctuation_and_symbols() {
        let normalizer = normalizer(&[]);
        assert_eq!(normalizer.normalize("好看！！真的，太好看了~~"), "好看真的太好看了");
        assert_eq!(normalizer.normalize("wow... so_good 😀 100%"), "wow so_good  100");
    }

    #[test]
    fn removes_bracketed_emoji_markers_and_fillers() {
        let normalizer = Normalizer::default();
        assert_eq!(normalizer.normalize("[比心][玫瑰]主播唱得好"), "主播唱得好");
        assert_eq!(normalizer.normalize("哈哈哈哈哈哈笑死"), "笑死");
        // "赞" precedes the longer phrase in the list, so the phrase never gets a chance to match
        assert_eq!(normalizer.normalize("给你点一百个赞！"), "给你点一百个");
    }

    #[test]
    fn patterns_are_removed_in_list_order() {
        // "点赞" goes first, so the trailing "赞" of it never survives on its own
        let normalizer = normalizer(&["点赞", "赞"]);
        assert_eq!(normalizer.normalize("点赞好评赞"), "好评");
    }

    #[test]
    fn normalization_is_idempotent() {
        let normalizer = normalizer(&["哈哈哈", "赞", "[看]"]);
        let samples = [
            "",
            "   ",
            "哈哈赞哈",
            "哈[看]哈哈",
            "[[看]]",
            "Mixed 文本, with punctuation!?",
            "赞赞赞哈哈哈哈",
            "__init__ 🎉🎉",
        ];

        for sample in samples {
            let once = normalizer.normalize(sample);
            assert_eq!(normalizer.normalize(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn empty_patterns_are_ignored() {
        let normalizer = normalizer(&["", "x"]);
        assert_eq!(normalizer.normalize("axb"), "ab");
    }
}
