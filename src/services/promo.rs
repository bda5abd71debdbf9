use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::models::{DiscountKind, PromoCode};
use crate::store::PromoStore;
use crate::utils::error::AppError;

/// Validates a promo code against a purchase amount at a point in time.
pub fn validate(promo: &PromoCode, purchase_amount: Decimal, now: DateTime<Utc>) -> Result<(), AppError> {
    if !promo.is_active {
        return Err(AppError::InvalidPromoCode(
            "This promo code is no longer active".to_string(),
        ));
    }
    if let Some(from) = promo.valid_from {
        if now < from {
            return Err(AppError::InvalidPromoCode(
                "This promo code is not valid yet".to_string(),
            ));
        }
    }
    if let Some(until) = promo.valid_until {
        if now > until {
            return Err(AppError::InvalidPromoCode(
                "This promo code has expired".to_string(),
            ));
        }
    }
    if purchase_amount < promo.min_purchase_amount {
        return Err(AppError::InvalidPromoCode(format!(
            "A minimum purchase of {} is required for this code",
            promo.min_purchase_amount
        )));
    }
    if promo.is_exhausted() {
        return Err(AppError::InvalidPromoCode(
            "This promo code has reached its usage limit".to_string(),
        ));
    }
    Ok(())
}

/// Discount for a purchase amount. Never negative and never more than the
/// purchase itself.
pub fn compute_discount(
    kind: DiscountKind,
    value: Decimal,
    purchase_amount: Decimal,
    max_discount_amount: Option<Decimal>,
) -> Decimal {
    let raw = match kind {
        DiscountKind::Percentage => {
            let pct = purchase_amount * value / Decimal::from(100);
            match max_discount_amount {
                Some(cap) => pct.min(cap),
                None => pct,
            }
        }
        DiscountKind::Fixed => value,
    };
    raw.min(purchase_amount).max(Decimal::ZERO).round_dp(2)
}

pub struct PromoService {
    promos: Arc<PromoStore>,
}

impl PromoService {
    pub fn new(promos: Arc<PromoStore>) -> Self {
        Self { promos }
    }

    /// Resolves a raw code into (normalized code, discount amount) for the
    /// given purchase.
    pub fn evaluate(
        &self,
        raw_code: &str,
        purchase_amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<(String, Decimal), AppError> {
        let promo = self.promos.get(raw_code).ok_or_else(|| {
            AppError::InvalidPromoCode("This promo code does not exist".to_string())
        })?;
        validate(&promo, purchase_amount, now)?;
        let discount = compute_discount(
            promo.kind,
            promo.value,
            purchase_amount,
            promo.max_discount_amount,
        );
        Ok((promo.code, discount))
    }

    pub fn record_use(&self, code: &str) {
        self.promos.record_use(code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn promo() -> PromoCode {
        PromoCode {
            code: "SAVE25".to_string(),
            kind: DiscountKind::Percentage,
            value: Decimal::from(25),
            min_purchase_amount: Decimal::from(500),
            max_discount_amount: Some(Decimal::from(100)),
            valid_from: None,
            valid_until: None,
            max_uses: Some(10),
            use_count: 0,
            is_active: true,
        }
    }

    #[test]
    fn test_percentage_capped_by_max_discount() {
        let discount = compute_discount(
            DiscountKind::Percentage,
            Decimal::from(25),
            Decimal::from(1000),
            Some(Decimal::from(100)),
        );
        assert_eq!(discount, Decimal::from(100));
    }

    #[test]
    fn test_fixed_capped_by_purchase_amount() {
        let discount = compute_discount(
            DiscountKind::Fixed,
            Decimal::from(100),
            Decimal::from(80),
            None,
        );
        assert_eq!(discount, Decimal::from(80));
    }

    #[test]
    fn test_percentage_without_cap() {
        let discount = compute_discount(
            DiscountKind::Percentage,
            Decimal::from(10),
            Decimal::from(450),
            None,
        );
        assert_eq!(discount, Decimal::from(45));
    }

    #[test]
    fn test_discount_never_negative() {
        let discount = compute_discount(
            DiscountKind::Fixed,
            Decimal::from(-20),
            Decimal::from(100),
            None,
        );
        assert_eq!(discount, Decimal::ZERO);
    }

    #[test]
    fn test_validate_minimum_purchase() {
        let promo = promo();
        let now = Utc::now();
        assert!(validate(&promo, Decimal::from(499), now).is_err());
        assert!(validate(&promo, Decimal::from(500), now).is_ok());
    }

    #[test]
    fn test_validate_window() {
        let mut promo = promo();
        let now = Utc::now();
        promo.valid_from = Some(now + chrono::Duration::hours(1));
        assert!(validate(&promo, Decimal::from(1000), now).is_err());

        promo.valid_from = Some(now - chrono::Duration::hours(2));
        promo.valid_until = Some(now - chrono::Duration::hours(1));
        assert!(validate(&promo, Decimal::from(1000), now).is_err());

        promo.valid_until = Some(now + chrono::Duration::hours(1));
        assert!(validate(&promo, Decimal::from(1000), now).is_ok());
    }

    #[test]
    fn test_validate_inactive_and_exhausted() {
        let mut promo = promo();
        let now = Utc::now();
        promo.is_active = false;
        assert!(validate(&promo, Decimal::from(1000), now).is_err());

        promo.is_active = true;
        promo.use_count = 10;
        assert!(validate(&promo, Decimal::from(1000), now).is_err());
    }
}
