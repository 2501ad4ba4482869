// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! TF-IDF document vectorization
//!
//! - Lowercasing, tokens matching `(?u)\b\w\w+\b`
//! - English stop words removed
//! - Vocabulary bounded to the most frequent terms, indexed alphabetically
//! - Smooth idf: `ln((1 + n) / (1 + df)) + 1`
//! - Raw term counts times idf, rows L2-normalized

use ndarray::Array2;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

use super::stop_words::is_stop_word;
use super::ClusteringError;

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?u)\b\w\w+\b").expect("token pattern is valid"))
}

/// Splits `text` into lowercase, non-stop-word tokens
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    token_pattern()
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|token| !is_stop_word(token))
        .map(str::to_string)
        .collect()
}

/// Document-term matrix produced by [`TfidfVectorizer::fit_transform`]
#[derive(Debug, Clone)]
pub struct TfidfMatrix {
    /// Feature names, sorted alphabetically; column `j` is `vocabulary[j]`
    pub vocabulary: Vec<String>,

    /// `[n_documents, vocabulary.len()]`
    pub weights: Array2<f64>,
}

/// TF-IDF vectorizer fitted on the corpus it transforms
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    max_features: usize,
}

impl TfidfVectorizer {
    pub fn new(max_features: usize) -> Self {
        Self { max_features }
    }

    /// Learns the vocabulary and idf of `texts` and returns their weights
    ///
    /// # Errors
    ///
    /// [`ClusteringError::EmptyVocabulary`] when no text contains a usable
    /// token (for example, stop words only).
    pub fn fit_transform(&self, texts: &[String]) -> Result<TfidfMatrix, ClusteringError> {
        let documents: Vec<HashMap<String, usize>> = texts
            .iter()
            .map(|text| {
                let mut counts = HashMap::new();
                for token in tokenize(text) {
                    *counts.entry(token).or_insert(0) += 1;
                }
                counts
            })
            .collect();

        // term -> (corpus frequency, document frequency)
        let mut stats: HashMap<&str, (usize, usize)> = HashMap::new();
        for counts in &documents {
            for (term, &count) in counts {
                let entry = stats.entry(term.as_str()).or_insert((0, 0));
                entry.0 += count;
                entry.1 += 1;
            }
        }

        if stats.is_empty() {
            return Err(ClusteringError::EmptyVocabulary);
        }

        let mut ranked: Vec<(&str, usize, usize)> =
            stats.into_iter().map(|(term, (tf, df))| (term, tf, df)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(self.max_features);
        ranked.sort_by(|a, b| a.0.cmp(b.0));

        let n_docs = texts.len() as f64;
        let vocabulary: Vec<String> = ranked.iter().map(|(term, _, _)| term.to_string()).collect();
        let idf: Vec<f64> = ranked
            .iter()
            .map(|&(_, _, df)| ((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0)
            .collect();
        let columns: HashMap<&str, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(j, term)| (term.as_str(), j))
            .collect();

        let mut weights = Array2::<f64>::zeros((texts.len(), vocabulary.len()));
        for (i, counts) in documents.iter().enumerate() {
            for (term, &count) in counts {
                if let Some(&j) = columns.get(term.as_str()) {
                    weights[[i, j]] = count as f64 * idf[j];
                }
            }

            let mut row = weights.row_mut(i);
            let norm = row.dot(&row).sqrt();
            if norm > 0.0 {
                row /= norm;
            }
        }

        Ok(TfidfMatrix { vocabulary, weights })
    }
}
