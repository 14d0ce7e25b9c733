#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod cancel;
pub mod chunker;
pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use cancel::{cancel_pair, CancelHandle, CancelToken};
pub use chunker::{chunk, chunk_text, ChunkingConfig};
pub use error::{Error, ProviderError, Result};
pub use types::{Chunk, ChunkPosition, EmbedMode, RetrievalResult, ScoredChunk, SearchHit, StrategyKind};
