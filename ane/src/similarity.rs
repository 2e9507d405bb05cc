//! Text similarity used to decide whether an item corresponds to a need,
//! offering, goal criterion or deal-breaker.
//!
//! Matching is an approximate textual heuristic. It sits behind the
//! [`TextMatcher`] trait so the rest of the engine does not depend on one
//! strategy:
//!
//! - [`ExactMatcher`]: case-insensitive equality only
//! - [`TokenOverlapMatcher`]: substring and partial-token overlap (default)
//! - [`EmbeddingMatcher`]: cosine similarity over an [`Embedder`]

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Common trait for text similarity strategies.
pub trait TextMatcher: Send + Sync {
    /// Name of the strategy.
    fn name(&self) -> &str;

    /// Similarity of two texts (0.0 - 1.0). Zero means no correspondence.
    fn similarity(&self, left: &str, right: &str) -> f64;

    /// Whether the texts correspond at all.
    fn matches(&self, left: &str, right: &str) -> bool {
        self.similarity(left, right) > 0.0
    }

    /// Best similarity of `text` against any candidate.
    fn best_match(&self, text: &str, candidates: &[String]) -> f64 {
        candidates
            .iter()
            .map(|c| self.similarity(text, c))
            .fold(0.0, f64::max)
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Matches only texts that are equal ignoring case and surrounding space.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatcher;

impl TextMatcher for ExactMatcher {
    fn name(&self) -> &str {
        "exact"
    }

    fn similarity(&self, left: &str, right: &str) -> f64 {
        let (l, r) = (normalize(left), normalize(right));
        if !l.is_empty() && l == r {
            1.0
        } else {
            0.0
        }
    }
}

const STOPWORDS: &[&str] = &["and", "for", "the", "with", "our", "from", "into", "that", "this"];

/// Substring and partial-token matcher.
///
/// Exact equality scores 1.0, containment of one text in the other 0.75,
/// and token overlap between 0.25 and 0.65 depending on how many tokens of
/// the shorter text find a partner. Tokens partner when equal or when one
/// is a prefix of the other (`fund` / `funding`).
#[derive(Debug, Clone)]
pub struct TokenOverlapMatcher {
    /// Tokens shorter than this are ignored
    min_token_len: usize,
    /// Shortest prefix accepted as a partial token match
    min_prefix_len: usize,
}

impl TokenOverlapMatcher {
    /// Create a matcher with default token rules.
    pub fn new() -> Self {
        Self {
            min_token_len: 3,
            min_prefix_len: 4,
        }
    }

    fn tokens(&self, text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.len() >= self.min_token_len)
            .map(str::to_lowercase)
            .filter(|t| !STOPWORDS.contains(&t.as_str()))
            .collect()
    }

    fn tokens_match(&self, a: &str, b: &str) -> bool {
        if a == b {
            return true;
        }
        let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
        short.len() >= self.min_prefix_len && long.starts_with(short)
    }
}

impl Default for TokenOverlapMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMatcher for TokenOverlapMatcher {
    fn name(&self) -> &str {
        "token_overlap"
    }

    fn similarity(&self, left: &str, right: &str) -> f64 {
        let (l, r) = (normalize(left), normalize(right));
        if l.is_empty() || r.is_empty() {
            return 0.0;
        }
        if l == r {
            return 1.0;
        }
        if l.contains(&r) || r.contains(&l) {
            return 0.75;
        }

        let left_tokens = self.tokens(&l);
        let right_tokens = self.tokens(&r);
        let shorter = left_tokens.len().min(right_tokens.len());
        if shorter == 0 {
            return 0.0;
        }

        let matched = left_tokens
            .iter()
            .filter(|lt| right_tokens.iter().any(|rt| self.tokens_match(lt, rt)))
            .count()
            .min(shorter);

        if matched == 0 {
            0.0
        } else {
            0.25 + 0.4 * (matched as f64 / shorter as f64)
        }
    }
}

/// Produces vector representations of text.
pub trait Embedder: Send + Sync {
    /// Embed a text.
    fn embed(&self, text: &str) -> Vec<f32>;
}

/// Embeds text as hashed character trigram counts.
///
/// Cheap and deterministic; useful offline and in tests where a model
/// backed embedder is not available.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    /// Create an embedder with the given vector size.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(128)
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let chars: Vec<char> = normalize(text).chars().collect();
        for window in chars.windows(3) {
            let mut hasher = DefaultHasher::new();
            window.hash(&mut hasher);
            let bucket = (hasher.finish() % self.dimensions as u64) as usize;
            vector[bucket] += 1.0;
        }
        vector
    }
}

/// Cosine similarity matcher over an embedder.
pub struct EmbeddingMatcher<E: Embedder> {
    embedder: E,
    /// Cosine similarity below which texts do not correspond
    threshold: f64,
}

impl<E: Embedder> EmbeddingMatcher<E> {
    /// Create a matcher.
    pub fn new(embedder: E, threshold: f64) -> Self {
        Self {
            embedder,
            threshold: threshold.clamp(0.0, 1.0),
        }
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
    }
}

impl<E: Embedder> TextMatcher for EmbeddingMatcher<E> {
    fn name(&self) -> &str {
        "embedding"
    }

    fn similarity(&self, left: &str, right: &str) -> f64 {
        let score = cosine(&self.embedder.embed(left), &self.embedder.embed(right));
        if score >= self.threshold && score > 0.0 {
            score
        } else {
            0.0
        }
    }
}
