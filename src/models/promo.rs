use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscountKind {
    Percentage,
    Fixed,
}

/// Discount rule administered externally; the only field this service owns
/// is `use_count`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoCode {
    /// Stored case-normalized (uppercase, trimmed).
    pub code: String,
    pub kind: DiscountKind,
    pub value: Decimal,
    pub min_purchase_amount: Decimal,
    pub max_discount_amount: Option<Decimal>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub max_uses: Option<u32>,
    pub use_count: u32,
    pub is_active: bool,
}

impl PromoCode {
    pub fn normalize(raw: &str) -> String {
        raw.trim().to_uppercase()
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.max_uses, Some(cap) if self.use_count >= cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(PromoCode::normalize("  welcome10 "), "WELCOME10");
    }

    #[test]
    fn test_exhaustion() {
        let mut promo = PromoCode {
            code: "FLAT50".to_string(),
            kind: DiscountKind::Fixed,
            value: Decimal::from(50),
            min_purchase_amount: Decimal::ZERO,
            max_discount_amount: None,
            valid_from: None,
            valid_until: None,
            max_uses: Some(2),
            use_count: 0,
            is_active: true,
        };
        assert!(!promo.is_exhausted());
        promo.use_count = 2;
        assert!(promo.is_exhausted());

        promo.max_uses = None;
        assert!(!promo.is_exhausted());
    }
}
