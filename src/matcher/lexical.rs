use super::index::{DocTerms, LexicalIndex};
use super::tokenizer::tokenize;
use serde::Serialize;

/// One ranked entry. Callers join ids back to full recipes themselves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scored {
    pub id: String,
    pub score: f64,
}

/// Flatten the query strings into one token sequence. Duplicate
/// ingredients are preserved and weight their tokens accordingly.
pub fn query_tokens(query: &[String]) -> Vec<String> {
    tokenize(&query.join(" "))
}

fn score_doc(tokens: &[String], doc: &DocTerms, index: &LexicalIndex) -> f64 {
    let n = index.doc_count() as f64;
    let mut score = 0.0;
    for token in tokens {
        let tf = doc.tf.get(token).copied().unwrap_or(0);
        if tf == 0 {
            continue;
        }
        let df = index.df(token).max(1) as f64;
        score += f64::from(tf) * (1.0 + n / df).ln();
    }
    score
}

/// Score every indexed document against the query and sort descending.
/// The sort is stable, so equal scores keep their corpus order. This
/// ordering rule is part of the contract, not an accident. An empty
/// query scores everything zero and returns the corpus order unchanged.
pub fn rank(index: &LexicalIndex, query: &[String]) -> Vec<Scored> {
    let tokens = query_tokens(query);

    let mut scored: Vec<Scored> = index
        .docs()
        .iter()
        .map(|doc| Scored {
            id: doc.id.clone(),
            score: score_doc(&tokens, doc, index),
        })
        .collect();

    // Vec::sort_by is stable; scores are finite so total_cmp gives a
    // plain descending order
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}
