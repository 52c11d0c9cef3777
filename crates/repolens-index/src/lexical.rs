//! In-memory BM25 over the document store.
//!
//! The index is rebuilt from scratch after every batch of additions, so a
//! reader never sees statistics that mix two store generations.

use std::collections::{HashMap, HashSet};

const K1: f32 = 1.5;
const B: f32 = 0.75;

/// Split on non-alphanumeric boundaries and case-fold.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[derive(Debug, Default)]
pub struct LexicalIndex {
    term_freqs: Vec<HashMap<String, u32>>,
    doc_lens: Vec<usize>,
    avg_len: f32,
    doc_freqs: HashMap<String, usize>,
}

impl LexicalIndex {
    /// Build over texts in document-store order.
    #[must_use]
    pub fn build<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
        let mut term_freqs = Vec::new();
        let mut doc_lens = Vec::new();
        let mut doc_freqs: HashMap<String, usize> = HashMap::new();

        for text in texts {
            let tokens = tokenize(text);
            doc_lens.push(tokens.len());
            let mut tf: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *tf.entry(token).or_insert(0) += 1;
            }
            for term in tf.keys() {
                *doc_freqs.entry(term.clone()).or_insert(0) += 1;
            }
            term_freqs.push(tf);
        }

        #[allow(clippy::cast_precision_loss)]
        let avg_len = if doc_lens.is_empty() {
            0.0
        } else {
            doc_lens.iter().sum::<usize>() as f32 / doc_lens.len() as f32
        };

        Self {
            term_freqs,
            doc_lens,
            avg_len,
            doc_freqs,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.term_freqs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.term_freqs.is_empty()
    }

    #[allow(clippy::cast_precision_loss)]
    fn idf(&self, term: &str) -> f32 {
        let n = self.len() as f32;
        let df = self.doc_freqs.get(term).copied().unwrap_or(0) as f32;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    /// BM25 score of every document, in store order.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn scores(&self, query: &str) -> Vec<f32> {
        let terms: HashSet<String> = tokenize(query).into_iter().collect();
        let mut scores = vec![0.0_f32; self.len()];
        if terms.is_empty() || self.avg_len == 0.0 {
            return scores;
        }

        for term in &terms {
            if !self.doc_freqs.contains_key(term) {
                continue;
            }
            let idf = self.idf(term);
            for (i, tf_map) in self.term_freqs.iter().enumerate() {
                let Some(&tf) = tf_map.get(term) else {
                    continue;
                };
                let tf = tf as f32;
                let norm = 1.0 - B + B * self.doc_lens[i] as f32 / self.avg_len;
                scores[i] += idf * tf * (K1 + 1.0) / (tf + K1 * norm);
            }
        }
        scores
    }

    /// Positions of the best `limit` documents with a positive score.
    /// Ties keep store order.
    #[must_use]
    pub fn top(&self, query: &str, limit: usize) -> Vec<(usize, f32)> {
        let mut ranked: Vec<(usize, f32)> = self
            .scores(query)
            .into_iter()
            .enumerate()
            .filter(|(_, s)| *s > 0.0)
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(limit);
        ranked
    }
}
