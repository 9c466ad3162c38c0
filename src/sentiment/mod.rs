//! Lexical sentiment scoring and batch aggregation over social posts.

mod lexicon;

pub use lexicon::Lexicon;

use crate::models::{RawPost, SentimentReport, SentimentSample, WordFrequencyReport};

#[derive(Debug, Clone, PartialEq)]
pub struct TextScore {
    pub score: i32,
    pub comparative: f64,
    pub tokens: Vec<String>,
}

/// Everything the sentiment endpoint reports for one batch of posts.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchAnalysis {
    pub report: SentimentReport,
    pub word_frequencies: WordFrequencyReport,
    pub malformed_posts: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SentimentAnalyzer {
    lexicon: Lexicon,
}

impl SentimentAnalyzer {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn score_text(&self, text: &str) -> TextScore {
        let tokens = tokenize(text);
        let score: i32 = tokens.iter().map(|t| self.lexicon.weight(t)).sum();
        let comparative = f64::from(score) / tokens.len().max(1) as f64;
        TextScore {
            score,
            comparative,
            tokens,
        }
    }

    /// Scores `title + " " + body` for every post. A post missing either field
    /// is scored with an empty string in its place and counted as malformed.
    pub fn analyze_posts(&self, posts: &[RawPost]) -> BatchAnalysis {
        let mut samples = Vec::with_capacity(posts.len());
        let mut token_lists = Vec::with_capacity(posts.len());
        let mut malformed_posts = 0;

        for (idx, post) in posts.iter().enumerate() {
            if post.title.is_none() || post.body.is_none() {
                malformed_posts += 1;
                tracing::warn!(
                    index = idx,
                    missing_title = post.title.is_none(),
                    missing_body = post.body.is_none(),
                    "post is missing fields, scoring with empty text"
                );
            }
            let title = post.title.as_deref().unwrap_or_default();
            let body = post.body.as_deref().unwrap_or_default();

            let scored = self.score_text(&format!("{} {}", title, body));
            samples.push(SentimentSample {
                title: title.to_string(),
                score: scored.score,
                comparative: scored.comparative,
            });
            token_lists.push(scored.tokens);
        }

        BatchAnalysis {
            report: aggregate(samples),
            word_frequencies: word_frequencies(&token_lists),
            malformed_posts,
        }
    }
}

/// Lower-cases and splits on anything that is not an ASCII alphanumeric or an
/// apostrophe.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Mean of the sample scores; zero for an empty batch.
pub fn aggregate(samples: Vec<SentimentSample>) -> SentimentReport {
    let posts_analyzed = samples.len();
    let average_score = if posts_analyzed == 0 {
        0.0
    } else {
        let total: f64 = samples.iter().map(|s| f64::from(s.score)).sum();
        total / posts_analyzed as f64
    };
    SentimentReport {
        average_score,
        posts_analyzed,
        samples,
    }
}

pub fn word_frequencies<T: AsRef<str>>(token_lists: &[Vec<T>]) -> WordFrequencyReport {
    let mut counts = WordFrequencyReport::new();
    for token in token_lists.iter().flatten() {
        *counts.entry(token.as_ref().to_lowercase()).or_insert(0) += 1;
    }
    counts
}
