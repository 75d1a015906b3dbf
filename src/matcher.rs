//! Free-text to codeword matching (transmitter side).
//!
//! The operator types whatever they like; the matcher maps it to the
//! nearest dictionary sentence with TF-IDF vectors and cosine
//! similarity. Below the configured threshold nothing matches and the
//! protocol takes no action at all.

use crate::dictionary::Dictionary;
use std::collections::HashMap;

/// Default minimum cosine similarity accepted as a match.
pub const DEFAULT_THRESHOLD: f64 = 0.2;

#[derive(Debug, Clone, PartialEq)]
pub struct MatchHit {
    pub sentence: String,
    pub codeword: u8,
    pub score: f64,
}

pub trait Matcher {
    fn best_match(&self, text: &str) -> Option<MatchHit>;
}

/// TF-IDF matcher over the dictionary sentences.
///
/// Smooth idf (`ln((1+n)/(1+df)) + 1`), raw term counts, L2-normalized
/// rows; cosine similarity is then a sparse dot product. Ties and the
/// best row are resolved in load order (earliest sentence wins).
pub struct TfIdfMatcher {
    vocab: HashMap<String, usize>,
    idf: Vec<f64>,
    rows: Vec<Row>,
    threshold: f64,
}

struct Row {
    sentence: String,
    codeword: u8,
    // term index -> normalized tf-idf weight
    weights: HashMap<usize, f64>,
}

impl TfIdfMatcher {
    pub fn new(dictionary: &Dictionary, threshold: f64) -> Self {
        let docs: Vec<(String, u8, Vec<String>)> = dictionary
            .sentences()
            .iter()
            .filter_map(|s| {
                dictionary
                    .codeword(s)
                    .map(|cw| (s.clone(), cw, tokenize(s)))
            })
            .collect();

        let mut vocab: HashMap<String, usize> = HashMap::new();
        let mut df: Vec<usize> = Vec::new();
        for (_, _, tokens) in &docs {
            let mut seen: Vec<usize> = Vec::new();
            for tok in tokens {
                let idx = *vocab.entry(tok.clone()).or_insert_with(|| {
                    df.push(0);
                    df.len() - 1
                });
                if !seen.contains(&idx) {
                    seen.push(idx);
                    df[idx] += 1;
                }
            }
        }

        let n = docs.len() as f64;
        let idf: Vec<f64> = df
            .iter()
            .map(|&d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
            .collect();

        let rows = docs
            .into_iter()
            .map(|(sentence, codeword, tokens)| Row {
                sentence,
                codeword,
                weights: weigh(&tokens, &vocab, &idf),
            })
            .collect();

        Self {
            vocab,
            idf,
            rows,
            threshold,
        }
    }
}

impl Matcher for TfIdfMatcher {
    fn best_match(&self, text: &str) -> Option<MatchHit> {
        let query = weigh(&tokenize(text), &self.vocab, &self.idf);
        if query.is_empty() {
            return None;
        }

        let mut best: Option<(f64, &Row)> = None;
        for row in &self.rows {
            let score: f64 = query
                .iter()
                .filter_map(|(idx, w)| row.weights.get(idx).map(|rw| w * rw))
                .sum();
            // Strict greater-than keeps the earliest row on ties.
            if best.map_or(true, |(s, _)| score > s) {
                best = Some((score, row));
            }
        }

        let (score, row) = best?;
        if score < self.threshold {
            return None;
        }
        Some(MatchHit {
            sentence: row.sentence.clone(),
            codeword: row.codeword,
            score,
        })
    }
}

/// Lowercased alphanumeric runs of at least two characters.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= 2)
        .map(str::to_string)
        .collect()
}

/// L2-normalized sparse tf-idf vector for a token list. Tokens outside
/// the vocabulary are dropped.
fn weigh(tokens: &[String], vocab: &HashMap<String, usize>, idf: &[f64]) -> HashMap<usize, f64> {
    let mut weights: HashMap<usize, f64> = HashMap::new();
    for tok in tokens {
        if let Some(&idx) = vocab.get(tok) {
            *weights.entry(idx).or_insert(0.0) += idf[idx];
        }
    }
    let norm: f64 = weights.values().map(|w| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for w in weights.values_mut() {
            *w /= norm;
        }
    }
    weights
}
