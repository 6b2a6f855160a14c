// Annotation spend tracking.
//
// Costs are estimated up front from word counts (roughly 1.3 tokens per
// word) and a fixed allowance for the JSON reply, priced per 1k tokens.

/// Per-1k-token pricing and the assumed reply size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    pub input_per_1k: f64,
    pub output_per_1k: f64,
    pub tokens_per_word: f64,
    pub output_tokens: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            input_per_1k: 0.01,
            output_per_1k: 0.03,
            tokens_per_word: 1.3,
            output_tokens: 150.0,
        }
    }
}

impl CostModel {
    /// Estimated USD cost of annotating `text`.
    pub fn estimate(&self, text: &str) -> f64 {
        let input_tokens = text.split_whitespace().count() as f64 * self.tokens_per_word;
        input_tokens / 1000.0 * self.input_per_1k + self.output_tokens / 1000.0 * self.output_per_1k
    }
}

/// Running total against a hard cap.
#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    cap: f64,
    spent: f64,
}

impl Budget {
    pub fn new(cap: f64) -> Self {
        Self { cap, spent: 0.0 }
    }

    /// Add `cost` to the running total. Returns false once the total
    /// exceeds the cap, in which case the row should not be sent.
    pub fn charge(&mut self, cost: f64) -> bool {
        self.spent += cost;
        self.spent <= self.cap
    }

    pub fn spent(&self) -> f64 {
        self.spent
    }

    pub fn cap(&self) -> f64 {
        self.cap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_for_ten_words() {
        let model = CostModel::default();
        // 13 input tokens + 150 output tokens
        let expected = 13.0 / 1000.0 * 0.01 + 150.0 / 1000.0 * 0.03;
        let cost = model.estimate("one two three four five six seven eight nine ten");
        assert!((cost - expected).abs() < 1e-12);
    }

    #[test]
    fn charge_stops_past_cap() {
        let mut budget = Budget::new(1.0);
        assert!(budget.charge(0.6));
        assert!(budget.charge(0.4));
        assert!(!budget.charge(0.01));
    }
}
