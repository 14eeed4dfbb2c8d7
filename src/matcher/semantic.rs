use super::index::LexicalIndex;
use super::lexical::{self, Scored};
use super::similarity::cosine;
use crate::corpus::Corpus;
use crate::embed::EmbedClient;
use futures::{stream, StreamExt};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// One complete, consistent batch of document embeddings for a corpus
/// version. Either every document has a vector and all vectors share a
/// length, or the batch does not exist at all.
#[derive(Debug)]
struct DocEmbeddings {
    fingerprint: String,
    ids: Vec<String>,
    vectors: Vec<Vec<f64>>,
}

/// Embedding-based ranking with a deterministic lexical fallback.
///
/// Document embeddings are the expensive part, so a completed batch is
/// cached against the corpus fingerprint and reused for every later
/// query until the corpus changes. Queries are embedded fresh each call.
/// Whenever the semantic preconditions fail (any document vector absent,
/// vector lengths inconsistent, query embedding absent) the whole query
/// is delegated to the lexical scorer, so callers always get a ranking.
/// A failed batch is never published, so the next call re-attempts the
/// embedding pass rather than staying degraded until the corpus changes.
#[derive(Clone)]
pub struct SemanticMatcher {
    client: EmbedClient,
    concurrency: usize,
    cache: Arc<RwLock<Option<Arc<DocEmbeddings>>>>,
}

impl SemanticMatcher {
    pub fn new(client: EmbedClient, concurrency: usize) -> Self {
        Self {
            client,
            concurrency: concurrency.max(1),
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Rank the corpus against the query by embedding cosine similarity,
    /// falling back to the lexical scorer whenever embeddings cannot be
    /// obtained for the full corpus or for the query.
    pub async fn rank(
        &self,
        corpus: &Corpus,
        index: &LexicalIndex,
        query: &[String],
    ) -> Vec<Scored> {
        let docs = match self.doc_embeddings(corpus).await {
            Some(docs) => docs,
            None => {
                info!("Semantic path unavailable, using lexical ranking");
                return lexical::rank(index, query);
            }
        };

        // Embedding input is the raw concatenated text, not tokens
        let query_text = query.join(" ");
        let query_vector = match self.client.embed(&query_text).await {
            Some(v) if !docs.vectors.is_empty() && v.len() != docs.vectors[0].len() => {
                warn!(
                    query_dims = v.len(),
                    doc_dims = docs.vectors[0].len(),
                    "Query embedding length differs from document embeddings"
                );
                return lexical::rank(index, query);
            }
            Some(v) => v,
            None => {
                // Cached document vectors stay valid for the next call
                info!("Query embedding unavailable, using lexical ranking");
                return lexical::rank(index, query);
            }
        };

        let mut scored: Vec<Scored> = docs
            .ids
            .iter()
            .zip(docs.vectors.iter())
            .map(|(id, vector)| Scored {
                id: id.clone(),
                score: cosine(&query_vector, vector),
            })
            .collect();

        // Same stable descending order and tie-break as the lexical path
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored
    }

    /// Return the cached embedding batch for this corpus version, or
    /// build one. Returns None when the batch cannot be completed; a
    /// partial batch is never cached, so an abandoned or failed build
    /// leaves the previous state untouched.
    async fn doc_embeddings(&self, corpus: &Corpus) -> Option<Arc<DocEmbeddings>> {
        let fingerprint = corpus.fingerprint();

        {
            let cache = self.cache.read().await;
            if let Some(docs) = cache.as_ref() {
                if docs.fingerprint == fingerprint {
                    debug!("Reusing cached document embeddings");
                    return Some(Arc::clone(docs));
                }
            }
        }

        let docs = Arc::new(self.embed_corpus(corpus, fingerprint).await?);
        *self.cache.write().await = Some(Arc::clone(&docs));
        Some(docs)
    }

    /// Embed every document concurrently. All-or-nothing: one absent
    /// vector or one length mismatch discards the whole batch, because
    /// similarity scores over partial coverage would not be comparable
    /// across documents.
    async fn embed_corpus(&self, corpus: &Corpus, fingerprint: String) -> Option<DocEmbeddings> {
        let texts: Vec<(String, String)> = corpus
            .iter()
            .map(|r| (r.id.clone(), r.ingredient_text()))
            .collect();

        // buffered (not buffer_unordered) keeps results in corpus order
        let results: Vec<Option<Vec<f64>>> = stream::iter(texts)
            .map(|(id, text)| {
                let client = self.client.clone();
                async move {
                    let vector = client.embed(&text).await;
                    if vector.is_none() {
                        warn!(id = %id, "No embedding for document");
                    }
                    vector
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut vectors = Vec::with_capacity(results.len());
        for result in results {
            vectors.push(result?);
        }

        if let Some(first) = vectors.first() {
            let dims = first.len();
            if vectors.iter().any(|v| v.len() != dims) {
                warn!("Document embeddings have inconsistent lengths");
                return None;
            }
            debug!(docs = vectors.len(), dims, "Embedded corpus");
        }

        Some(DocEmbeddings {
            fingerprint,
            ids: corpus.iter().map(|r| r.id.clone()).collect(),
            vectors,
        })
    }
}
