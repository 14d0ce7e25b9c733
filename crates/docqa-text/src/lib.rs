//! docqa-text
//!
//! Sparse lexical retrieval: tantivy's analyzer chain feeds a TF-IDF model
//! whose rows are ranked by cosine similarity.

pub mod tantivy_utils;
pub mod tfidf;
pub mod index;
pub mod search;

pub use index::SparseIndex;
pub use search::SparseStrategy;
pub use tfidf::{SparseVector, TfidfVectorizer};
