//! docqa-rag
//!
//! Question answering over a single document: index it with either strategy,
//! retrieve the best chunks for a question and have a generation backend
//! answer from them under a bounded retry policy.

pub mod answer;
pub mod index;
pub mod pipeline;
pub mod prompt;
pub mod retriever;
pub mod retry;

pub use answer::{AnswerOutcome, AnswerSynthesizer, NO_CONTEXT_REPLY};
pub use index::{Index, IndexedDocument};
pub use pipeline::Pipeline;
pub use retriever::Retriever;
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
