use docqa_core::types::RetrievalResult;

/// Separator placed between retrieved chunks in the prompt.
pub const CONTEXT_SEPARATOR: &str = "\n---\n";

/// Grounding prompt: instructions, then the retrieved content in rank order,
/// then the question.
pub fn build_prompt(query: &str, context: &RetrievalResult) -> String {
    let content = context.texts().collect::<Vec<_>>().join(CONTEXT_SEPARATOR);
    format!(
        "Answer the question based only on the following content. \
         Do not invent information. Be accurate and unbiased.\n\n\
         Content:\n{content}\n\n\
         Question: {query}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_core::types::{Chunk, ScoredChunk};

    #[test]
    fn chunks_keep_rank_order() {
        let hit = |position: usize, text: &str, score| ScoredChunk { chunk: Chunk { position, text: text.into() }, score };
        let context = RetrievalResult { hits: vec![hit(4, "second chunk", 0.9), hit(1, "first chunk", 0.2)] };
        let prompt = build_prompt("what?", &context);
        assert!(prompt.contains("Content:\nsecond chunk\n---\nfirst chunk\n"));
        assert!(prompt.trim_end().ends_with("Question: what?"));
        assert!(prompt.starts_with("Answer the question based only on the following content."));
    }
}
