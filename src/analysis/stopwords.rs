//! Stopword set used by the meaningful-word filter
//!
//! The set is an explicit value built once at startup and handed to the
//! analyzer; nothing here is global.

use crate::config::AnalysisConfig;
use std::collections::HashSet;
use std::path::Path;

/// The standard English stopword list (NLTK corpus, 179 words)
pub const ENGLISH: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
    "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

/// A fixed set of lowercase words excluded from frequency counts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    /// An empty set
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in English list
    pub fn english() -> Self {
        Self::empty().with_words(ENGLISH.iter().copied())
    }

    /// Reads a word list, one word per line
    ///
    /// Blank lines and lines starting with `#` are skipped.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::empty().with_words(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        ))
    }

    /// Builds the set the configuration asks for
    ///
    /// A configured file replaces the built-in list; extra words are added
    /// on top of either.
    pub fn from_config(config: &AnalysisConfig) -> std::io::Result<Self> {
        let base = match &config.stopwords_path {
            Some(path) => {
                let words = Self::from_file(Path::new(path))?;
                tracing::info!("Loaded {} stopwords from {}", words.len(), path);
                words
            }
            None => Self::english(),
        };
        Ok(base.with_words(config.extra_stopwords.iter().map(String::as_str)))
    }

    /// Adds words, lowercased
    pub fn with_words<'a>(mut self, words: impl IntoIterator<Item = &'a str>) -> Self {
        self.words
            .extend(words.into_iter().map(|word| word.to_lowercase()));
        self
    }

    /// Case-insensitive membership test
    pub fn contains(&self, word: &str) -> bool {
        if self.words.contains(word) {
            return true;
        }
        self.words.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
