//! Query model and pattern compilation
//!
//! Turns raw query text into normalized patterns the field matcher can scan
//! for. The default mode treats the whole query as one contiguous pattern;
//! multi-word queries are not split into boolean terms unless the caller
//! opts into [`TermMode::AllTerms`].

use super::error::SearchError;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

/// Shortest pattern (in chars) that is worth matching
pub const DEFAULT_MIN_MATCH_LEN: usize = 2;

/// What the caller asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// No fuzzy ranking: pass candidates through with a neutral score
    All,
    /// Rank candidates against this text
    Text(String),
}

impl Query {
    /// Absent and empty input both select [`Query::All`]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None => Query::All,
            Some("") => Query::All,
            Some(text) => Query::Text(text.to_string()),
        }
    }
}

impl From<&str> for Query {
    fn from(raw: &str) -> Self {
        Query::parse(Some(raw))
    }
}

/// How a multi-word query is turned into patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermMode {
    /// The whole query is one pattern
    #[default]
    Contiguous,
    /// Every word must match somewhere in the record
    AllTerms,
}

/// Case-folded, compatibility-normalized text
pub fn normalize(text: &str) -> String {
    text.nfkc().collect::<String>().to_lowercase()
}

/// A compiled search pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    text: String,
    chars: Vec<char>,
}

impl Pattern {
    /// Normalize and trim a query; reject it when shorter than `min_len` chars
    pub fn compile(raw: &str, min_len: usize) -> Result<Self, SearchError> {
        let text = normalize(raw).trim().to_string();
        let chars: Vec<char> = text.chars().collect();

        if chars.len() < min_len {
            return Err(SearchError::invalid_query(format!(
                "pattern '{}' is shorter than {} characters",
                text, min_len
            )));
        }

        Ok(Self { text, chars })
    }

    /// Compile a query according to the term mode
    ///
    /// In [`TermMode::AllTerms`] words shorter than `min_len` are dropped;
    /// the query is rejected only when no word survives.
    pub fn compile_query(raw: &str, min_len: usize, mode: TermMode) -> Result<Vec<Self>, SearchError> {
        match mode {
            TermMode::Contiguous => Ok(vec![Self::compile(raw, min_len)?]),
            TermMode::AllTerms => {
                let normalized = normalize(raw);
                let terms: Vec<Self> = normalized
                    .unicode_words()
                    .filter_map(|word| Self::compile(word, min_len).ok())
                    .collect();

                if terms.is_empty() {
                    return Err(SearchError::invalid_query(format!(
                        "no term in '{}' has at least {} characters",
                        normalized.trim(),
                        min_len
                    )));
                }

                Ok(terms)
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Length in chars
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_parse() {
        assert_eq!(Query::parse(None), Query::All);
        assert_eq!(Query::parse(Some("")), Query::All);
        assert_eq!(Query::from("grant"), Query::Text("grant".to_string()));
        // Whitespace is a real (if useless) query, not the pass-through mode
        assert_eq!(Query::from("  "), Query::Text("  ".to_string()));
    }

    #[test]
    fn test_compile_normalizes() {
        let pattern = Pattern::compile("  Marine BIOLOGY ", 2).unwrap();
        assert_eq!(pattern.as_str(), "marine biology");
        assert_eq!(pattern.len(), 14);
    }

    #[test]
    fn test_compile_counts_chars_not_bytes() {
        let pattern = Pattern::compile("Été", 3).unwrap();
        assert_eq!(pattern.as_str(), "été");
        assert_eq!(pattern.len(), 3);
    }

    #[test]
    fn test_compile_nfkc() {
        // Fullwidth letters fold to ASCII
        let pattern = Pattern::compile("ＡＢＣ", 2).unwrap();
        assert_eq!(pattern.as_str(), "abc");
    }

    #[test]
    fn test_compile_rejects_short() {
        assert!(matches!(
            Pattern::compile("a", 2),
            Err(SearchError::InvalidQuery { .. })
        ));
        assert!(Pattern::compile("   ", 1).is_err());
        assert!(Pattern::compile("ab", 2).is_ok());
    }

    #[test]
    fn test_compile_query_contiguous_keeps_spaces() {
        let terms = Pattern::compile_query("marine biology", 2, TermMode::Contiguous).unwrap();
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].as_str(), "marine biology");
    }

    #[test]
    fn test_compile_query_all_terms() {
        let terms = Pattern::compile_query("Marine a Biology", 2, TermMode::AllTerms).unwrap();
        let texts: Vec<&str> = terms.iter().map(Pattern::as_str).collect();
        assert_eq!(texts, vec!["marine", "biology"]);
    }

    #[test]
    fn test_compile_query_all_terms_rejects_when_nothing_survives() {
        assert!(Pattern::compile_query("a b c", 2, TermMode::AllTerms).is_err());
    }
}
