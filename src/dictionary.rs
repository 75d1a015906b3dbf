//! Codeword dictionary.
//!
//! CSV with a header row; column 0 is the codeword as an 8-bit binary
//! string, column 1 the sentence. Loaded once at startup, read-only
//! after that. The forward map (codeword -> sentence) must be injective,
//! so a duplicate codeword is a load error; duplicate sentences keep the
//! first codeword they appeared with.

use crate::error::{LinkError, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub struct Dictionary {
    by_codeword: HashMap<u8, String>,
    by_sentence: HashMap<String, u8>,
    // Load order, for the matcher's vector index.
    sentences: Vec<String>,
}

impl Dictionary {
    /// Load from a CSV file. Unreadable files, bad codeword columns and
    /// duplicate codewords all abort startup with a diagnostic.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| LinkError::dictionary(path, format!("unreadable: {e}")))?;

        let mut pairs = Vec::new();
        // First line is the header.
        for (lineno, line) in contents.lines().enumerate().skip(1) {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (code_field, sentence) = line.split_once(',').ok_or_else(|| {
                LinkError::dictionary(path, format!("line {}: missing sentence column", lineno + 1))
            })?;
            let codeword = u8::from_str_radix(code_field.trim(), 2).map_err(|_| {
                LinkError::dictionary(
                    path,
                    format!("line {}: bad codeword {:?}", lineno + 1, code_field.trim()),
                )
            })?;
            pairs.push((codeword, sentence.trim().to_string()));
        }

        Self::from_pairs(pairs).map_err(|e| match e {
            LinkError::Dictionary { reason, .. } => LinkError::dictionary(path, reason),
            other => other,
        })
    }

    /// Build from in-memory pairs. Used by `load` and by tests.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (u8, String)>) -> Result<Self> {
        let mut by_codeword = HashMap::new();
        let mut by_sentence = HashMap::new();
        let mut sentences = Vec::new();

        for (codeword, sentence) in pairs {
            if by_codeword.insert(codeword, sentence.clone()).is_some() {
                return Err(LinkError::dictionary(
                    "<pairs>",
                    format!("duplicate codeword {codeword:#010b}"),
                ));
            }
            // First occurrence wins in the reverse direction.
            by_sentence.entry(sentence.clone()).or_insert(codeword);
            sentences.push(sentence);
        }

        Ok(Self {
            by_codeword,
            by_sentence,
            sentences,
        })
    }

    pub fn sentence(&self, codeword: u8) -> Option<&str> {
        self.by_codeword.get(&codeword).map(String::as_str)
    }

    pub fn codeword(&self, sentence: &str) -> Option<u8> {
        self.by_sentence.get(sentence).copied()
    }

    /// Sentences in load order.
    pub fn sentences(&self) -> &[String] {
        &self.sentences
    }

    pub fn len(&self) -> usize {
        self.by_codeword.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_codeword.is_empty()
    }
}
