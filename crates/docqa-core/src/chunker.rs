use serde::{Deserialize, Serialize};

use crate::types::Chunk;

const STEP_EPSILON: f64 = 1e-9;

/// Window size (in whitespace tokens) and overlap between neighbouring windows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub size: usize,
    pub overlap: f64,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { size: 300, overlap: 0.2 }
    }
}

impl ChunkingConfig {
    pub fn new(size: usize, overlap: f64) -> Self {
        Self { size, overlap }
    }

    /// Tokens the window advances by: `floor(size * (1 - overlap))`, never
    /// zero so chunking always terminates.
    ///
    /// Decimal fractions such as 0.2 are not exact in binary, so the product
    /// is nudged by a tiny epsilon before flooring (300 * 0.8 must give 240).
    pub fn step(&self) -> usize {
        let size = self.size.max(1);
        let overlap = if self.overlap.is_finite() { self.overlap.clamp(0.0, 1.0) } else { 0.0 };
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let step = (size as f64 * (1.0 - overlap) + STEP_EPSILON).floor() as usize;
        step.max(1)
    }
}

/// Split text into whitespace tokens.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Slide a `size`-token window over `text` in steps of [`ChunkingConfig::step`].
///
/// The last window may be shorter than `size`. Sliding stops as soon as a
/// window reaches the final token, so no chunk is fully contained in its
/// predecessor. Text without tokens yields no chunks.
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> Vec<Chunk> {
    let words = tokenize(text);
    let size = config.size.max(1);
    let step = config.step();
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < words.len() {
        let end = (start + size).min(words.len());
        chunks.push(Chunk { position: chunks.len(), text: words[start..end].join(" ") });
        if end >= words.len() {
            break;
        }
        start += step;
    }
    chunks
}

/// Convenience form of [`chunk_text`] taking the raw parameters.
pub fn chunk(text: &str, size: usize, overlap_fraction: f64) -> Vec<Chunk> {
    chunk_text(text, &ChunkingConfig::new(size, overlap_fraction))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn step_matches_overlap() {
        assert_eq!(ChunkingConfig::new(300, 0.2).step(), 240);
        assert_eq!(ChunkingConfig::new(10, 0.0).step(), 10);
        assert_eq!(ChunkingConfig::new(10, 0.99).step(), 1);
        assert_eq!(ChunkingConfig::new(1, 0.5).step(), 1);
    }

    #[test]
    fn step_is_exact_for_decimal_overlaps() {
        assert_eq!(ChunkingConfig::new(200, 0.2).step(), 160);
        assert_eq!(ChunkingConfig::new(10, 0.3).step(), 7);
        assert_eq!(ChunkingConfig::new(100, 0.29).step(), 71);
        assert_eq!(ChunkingConfig::new(3, 0.1).step(), 2);
    }

    #[test]
    fn chunk_count_follows_window_formula() {
        for (n, size, overlap, expected) in [
            (10, 4, 0.25, 3),
            (11, 4, 0.25, 4),
            (300, 300, 0.2, 1),
            (301, 300, 0.2, 2),
            (1000, 300, 0.2, 4),
            (7, 3, 0.0, 3),
        ] {
            let cfg = ChunkingConfig::new(size, overlap);
            assert_eq!(chunk_text(&words(n), &cfg).len(), expected, "n={n} size={size} overlap={overlap}");
        }
    }

    #[test]
    fn default_windows_advance_by_240_tokens() {
        let chunks = chunk_text(&words(1000), &ChunkingConfig::default());
        let starts: Vec<_> = chunks.iter().map(|c| c.text.split(' ').next().unwrap_or_default()).collect();
        assert_eq!(starts, vec!["w0", "w240", "w480", "w720"]);
        assert!(chunks[3].text.ends_with("w999"));
    }

    #[test]
    fn short_text_is_one_tail_chunk() {
        let chunks = chunk("alpha  beta\n gamma", 300, 0.2);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "alpha beta gamma");
    }

    #[test]
    fn every_token_is_covered() {
        let text = words(53);
        let chunks = chunk(&text, 8, 0.3);
        for (i, token) in tokenize(&text).into_iter().enumerate() {
            assert!(
                chunks.iter().any(|c| c.text.split(' ').any(|t| t == token)),
                "token {i} missing"
            );
        }
        let positions: Vec<_> = chunks.iter().map(|c| c.position).collect();
        assert_eq!(positions, (0..chunks.len()).collect::<Vec<_>>());
    }

    #[test]
    fn empty_and_blank_text_yield_nothing() {
        assert!(chunk("", 300, 0.2).is_empty());
        assert!(chunk(" \n\t ", 300, 0.2).is_empty());
    }

    #[test]
    fn zero_step_still_terminates() {
        let chunks = chunk(&words(5), 2, 1.0);
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[3].text, "w3 w4");
    }
}
