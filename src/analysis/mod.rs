//! Corpus analysis
//!
//! This module turns a finished corpus into text statistics:
//! - Sentence and word segmentation of every post body
//! - The meaningful-word filter (not numeric, not a stopword, at least two
//!   characters)
//! - Counting into a frequency distribution of lowercased meaningful words
//!
//! Analysis is a pure batch transform. It can run sequentially or shard the
//! records over threads and merge the partial results; both give the same
//! output for the same input.

mod stopwords;
mod tokenize;

pub use stopwords::{StopWords, ENGLISH};
pub use tokenize::{sentences, words};

use crate::storage::PostRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Minimum length, in characters, of a meaningful word
pub const MIN_WORD_LENGTH: usize = 2;

/// Posts between progress log lines
const PROGRESS_INTERVAL: usize = 100;

/// Aggregate text statistics of a corpus
///
/// Serializes to the analysis report format. The frequency distribution is
/// ordered by word so reports are byte-for-byte reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusAnalysis {
    pub num_posts: usize,
    pub num_sentences: usize,
    pub num_words: usize,
    pub num_meaningful_words: usize,
    pub num_unique_words: usize,
    #[serde(rename = "freqDist")]
    pub freq_dist: BTreeMap<String, usize>,
}

impl CorpusAnalysis {
    /// Folds another partial analysis into this one
    ///
    /// Counts add up and frequency distributions are summed key-wise.
    pub fn merge(&mut self, other: CorpusAnalysis) {
        self.num_posts += other.num_posts;
        self.num_sentences += other.num_sentences;
        self.num_words += other.num_words;
        self.num_meaningful_words += other.num_meaningful_words;
        for (word, count) in other.freq_dist {
            *self.freq_dist.entry(word).or_insert(0) += count;
        }
        self.num_unique_words = self.freq_dist.len();
    }

    /// The `n` most frequent words, most frequent first
    ///
    /// Ties are broken alphabetically.
    pub fn top_words(&self, n: usize) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self
            .freq_dist
            .iter()
            .map(|(word, count)| (word.as_str(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(n);
        ranked
    }

    fn count_word(&mut self, word: String) {
        self.num_meaningful_words += 1;
        *self.freq_dist.entry(word).or_insert(0) += 1;
    }
}

/// Computes corpus statistics with an injected stopword set
#[derive(Debug, Clone)]
pub struct Analyzer {
    stopwords: StopWords,
}

impl Analyzer {
    pub fn new(stopwords: StopWords) -> Self {
        Self { stopwords }
    }

    pub fn stopwords(&self) -> &StopWords {
        &self.stopwords
    }

    /// Returns true if a token counts toward the frequency distribution
    pub fn is_meaningful(&self, word: &str) -> bool {
        let lower = word.to_lowercase();
        let numeric = !lower.is_empty() && lower.chars().all(char::is_numeric);
        !(numeric || self.stopwords.contains(&lower) || lower.chars().count() < MIN_WORD_LENGTH)
    }

    /// Analyzes a single post body
    pub fn analyze_body(&self, body: &str) -> CorpusAnalysis {
        let mut analysis = CorpusAnalysis {
            num_posts: 1,
            ..CorpusAnalysis::default()
        };

        for sentence in sentences(body) {
            analysis.num_sentences += 1;
            for word in words(sentence) {
                analysis.num_words += 1;
                if self.is_meaningful(word) {
                    analysis.count_word(word.to_lowercase());
                }
            }
        }

        analysis.num_unique_words = analysis.freq_dist.len();
        analysis
    }

    /// Analyzes every record on the calling thread
    pub fn analyze(&self, records: &[PostRecord]) -> CorpusAnalysis {
        tracing::info!("Starting analysis of {} posts", records.len());

        let mut analysis = CorpusAnalysis::default();
        for (i, record) in records.iter().enumerate() {
            if i % PROGRESS_INTERVAL == 0 {
                tracing::info!("Tokenizing post {} of {}", i + 1, records.len());
            }
            analysis.merge(self.analyze_body(&record.body));
        }

        tracing::info!(
            "Finished analysis: {} sentences, {} meaningful of {} words",
            analysis.num_sentences,
            analysis.num_meaningful_words,
            analysis.num_words
        );
        analysis
    }

    /// Analyzes the records split into `shards` contiguous chunks, one
    /// thread per chunk, then merges the partial results
    pub fn analyze_sharded(&self, records: &[PostRecord], shards: usize) -> CorpusAnalysis {
        if shards <= 1 || records.len() < 2 {
            return self.analyze(records);
        }

        let chunk_size = records.len().div_ceil(shards);
        tracing::info!(
            "Starting analysis of {} posts in {} shards",
            records.len(),
            records.len().div_ceil(chunk_size)
        );

        let partials: Vec<CorpusAnalysis> = std::thread::scope(|scope| {
            let handles: Vec<_> = records
                .chunks(chunk_size)
                .enumerate()
                .map(|(shard, chunk)| {
                    scope.spawn(move || {
                        let partial = chunk.iter().fold(CorpusAnalysis::default(), |mut acc, r| {
                            acc.merge(self.analyze_body(&r.body));
                            acc
                        });
                        tracing::debug!("Shard {} finished {} posts", shard, chunk.len());
                        partial
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(partial) => partial,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        });

        let mut analysis = CorpusAnalysis::default();
        for partial in partials {
            analysis.merge(partial);
        }

        tracing::info!(
            "Finished analysis: {} sentences, {} meaningful of {} words",
            analysis.num_sentences,
            analysis.num_meaningful_words,
            analysis.num_words
        );
        analysis
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(StopWords::english())
    }
}
