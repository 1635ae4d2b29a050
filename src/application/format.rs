//! Amount formatting shared by prompts and renderers.

/// Currency symbol and decimal places used to print amounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountStyle {
    pub currency_symbol: String,
    pub precision: usize,
}

impl Default for AmountStyle {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            precision: 2,
        }
    }
}

impl AmountStyle {
    pub fn format(&self, amount: f64) -> String {
        if self.currency_symbol.is_empty() {
            format!("{:.*}", self.precision, amount)
        } else {
            format!("{} {:.*}", self.currency_symbol, self.precision, amount)
        }
    }
}
