//! Word polarity weights on the AFINN scale (-5 very negative, +5 very
//! positive), extended with market slang seen in crypto discussion threads.

use std::collections::HashMap;

const WEIGHTS: &[(&str, i32)] = &[
    // general positive
    ("good", 3),
    ("great", 3),
    ("excellent", 3),
    ("amazing", 4),
    ("awesome", 4),
    ("best", 3),
    ("better", 2),
    ("love", 3),
    ("like", 2),
    ("happy", 3),
    ("excited", 3),
    ("exciting", 3),
    ("win", 4),
    ("winning", 4),
    ("success", 2),
    ("successful", 3),
    ("strong", 2),
    ("positive", 2),
    ("optimistic", 2),
    ("confident", 2),
    ("hope", 2),
    ("hopeful", 2),
    ("nice", 3),
    ("cool", 1),
    ("safe", 1),
    ("secure", 2),
    ("support", 2),
    ("growth", 2),
    ("gain", 2),
    ("gains", 2),
    ("profit", 2),
    ("profits", 2),
    ("rich", 2),
    ("improve", 2),
    ("improved", 2),
    ("innovative", 2),
    ("opportunity", 2),
    ("recover", 2),
    ("recovery", 2),
    ("rebound", 2),
    ("agree", 1),
    ("thanks", 2),
    ("thank", 2),
    ("wow", 4),
    ("yes", 1),
    // general negative
    ("bad", -3),
    ("worse", -3),
    ("worst", -3),
    ("terrible", -3),
    ("awful", -3),
    ("horrible", -3),
    ("hate", -3),
    ("sad", -2),
    ("angry", -3),
    ("afraid", -2),
    ("fear", -2),
    ("scared", -2),
    ("panic", -3),
    ("worry", -3),
    ("worried", -3),
    ("concern", -2),
    ("concerned", -2),
    ("risk", -2),
    ("risky", -2),
    ("lose", -3),
    ("losing", -3),
    ("loss", -3),
    ("losses", -3),
    ("lost", -3),
    ("fail", -2),
    ("failed", -2),
    ("failure", -2),
    ("problem", -2),
    ("problems", -2),
    ("trouble", -2),
    ("crisis", -3),
    ("collapse", -2),
    ("weak", -2),
    ("negative", -2),
    ("pessimistic", -2),
    ("warning", -3),
    ("broke", -1),
    ("broken", -1),
    ("stupid", -2),
    ("wrong", -2),
    ("no", -1),
    ("scam", -2),
    ("scammer", -3),
    ("fraud", -4),
    ("hack", -1),
    ("hacked", -2),
    ("stolen", -2),
    ("steal", -2),
    ("theft", -2),
    ("illegal", -3),
    ("ban", -2),
    ("banned", -2),
    ("lawsuit", -2),
    ("bubble", -2),
    ("ponzi", -4),
    // market slang
    ("bullish", 3),
    ("bull", 2),
    ("moon", 2),
    ("mooning", 3),
    ("pump", 1),
    ("rally", 2),
    ("surge", 2),
    ("soar", 2),
    ("soaring", 2),
    ("breakout", 2),
    ("hodl", 1),
    ("adoption", 2),
    ("ath", 2),
    ("bearish", -3),
    ("bear", -2),
    ("dump", -2),
    ("dumping", -2),
    ("crash", -2),
    ("crashing", -3),
    ("plunge", -2),
    ("plummet", -3),
    ("drop", -1),
    ("fud", -2),
    ("rekt", -3),
    ("rug", -3),
    ("rugpull", -4),
    ("liquidated", -3),
    ("capitulation", -2),
    ("dead", -3),
];

#[derive(Debug, Clone)]
pub struct Lexicon {
    weights: HashMap<&'static str, i32>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new()
    }
}

impl Lexicon {
    pub fn new() -> Self {
        Self {
            weights: WEIGHTS.iter().copied().collect(),
        }
    }

    /// Polarity of a lower-cased token; unknown tokens are neutral.
    pub fn weight(&self, token: &str) -> i32 {
        self.weights.get(token).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_stay_on_the_afinn_scale() {
        assert!(WEIGHTS.iter().all(|(_, w)| (-5..=5).contains(w) && *w != 0));
        assert!(WEIGHTS.iter().all(|(word, _)| *word == word.to_lowercase()));
    }

    #[test]
    fn no_duplicate_entries() {
        assert_eq!(Lexicon::new().len(), WEIGHTS.len());
    }

    #[test]
    fn unknown_tokens_are_neutral() {
        let lexicon = Lexicon::new();
        assert_eq!(lexicon.weight("blockchain"), 0);
        assert_eq!(lexicon.weight("bullish"), 3);
        assert_eq!(lexicon.weight("scam"), -2);
    }
}
