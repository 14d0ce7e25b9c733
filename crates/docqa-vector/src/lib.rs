//! docqa-vector
//!
//! Dense retrieval: chunk embeddings held in an in-memory candle tensor and
//! searched exhaustively by Euclidean distance.

pub mod index;
pub mod search;

pub use index::DenseIndex;
pub use search::DenseStrategy;
