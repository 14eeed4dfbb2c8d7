// Ingredient matching and ranking: a lexical TF-IDF path that always
// works, and a semantic embedding path that degrades to it.

pub mod coverage;
pub mod index;
pub mod lexical;
pub mod semantic;
pub mod similarity;
pub mod tokenizer;

// Re-exports
pub use coverage::{coverage, CoverageEntry};
pub use index::LexicalIndex;
pub use lexical::{rank, Scored};
pub use semantic::SemanticMatcher;
pub use similarity::cosine;
pub use tokenizer::tokenize;
