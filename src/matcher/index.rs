use super::tokenizer::tokenize;
use crate::corpus::Corpus;
use std::collections::HashMap;
use tracing::debug;

/// Per-document term counts, in corpus order.
#[derive(Debug, Clone)]
pub struct DocTerms {
    pub id: String,
    /// Token to in-document occurrence count. Absent means zero.
    pub tf: HashMap<String, u32>,
}

/// Term statistics over one corpus version. Immutable once built: a
/// corpus change means building a fresh index, never mutating this one,
/// so concurrent readers need no coordination.
#[derive(Debug, Clone)]
pub struct LexicalIndex {
    docs: Vec<DocTerms>,
    df: HashMap<String, u32>,
    doc_count: usize,
}

impl LexicalIndex {
    /// Build term statistics from the corpus. Pure and idempotent:
    /// identical corpora always yield identical indexes. An empty corpus
    /// is valid and yields an index that scores everything zero.
    pub fn build(corpus: &Corpus) -> Self {
        let mut df: HashMap<String, u32> = HashMap::new();

        let docs: Vec<DocTerms> = corpus
            .iter()
            .map(|recipe| {
                let mut tf: HashMap<String, u32> = HashMap::new();
                for token in tokenize(&recipe.ingredient_text()) {
                    *tf.entry(token).or_insert(0) += 1;
                }
                // df counts documents, not occurrences: one increment per
                // distinct token per document
                for token in tf.keys() {
                    *df.entry(token.clone()).or_insert(0) += 1;
                }
                DocTerms {
                    id: recipe.id.clone(),
                    tf,
                }
            })
            .collect();

        debug!(
            docs = docs.len(),
            vocabulary = df.len(),
            "Built lexical index"
        );

        LexicalIndex {
            docs,
            df,
            doc_count: corpus.len(),
        }
    }

    /// Documents in original corpus order.
    pub fn docs(&self) -> &[DocTerms] {
        &self.docs
    }

    /// Number of documents containing the token at least once.
    pub fn df(&self, token: &str) -> u32 {
        self.df.get(token).copied().unwrap_or(0)
    }

    /// Corpus size at build time.
    pub fn doc_count(&self) -> usize {
        self.doc_count
    }

    pub fn vocabulary_size(&self) -> usize {
        self.df.len()
    }
}
