use dashmap::DashMap;
use tracing::warn;

use crate::models::PromoCode;

/// Promo codes are administered externally; this store owns only the use
/// counter. Keys are case-normalized.
pub struct PromoStore {
    codes: DashMap<String, PromoCode>,
}

impl PromoStore {
    pub fn new() -> Self {
        Self {
            codes: DashMap::new(),
        }
    }

    pub fn insert(&self, mut promo: PromoCode) {
        promo.code = PromoCode::normalize(&promo.code);
        self.codes.insert(promo.code.clone(), promo);
    }

    pub fn get(&self, code: &str) -> Option<PromoCode> {
        self.codes.get(&PromoCode::normalize(code)).map(|p| p.clone())
    }

    /// Increments the use counter, once per confirmed booking. The cap is
    /// re-checked under the entry lock because validation happened before
    /// payment completed.
    pub fn record_use(&self, code: &str) {
        let key = PromoCode::normalize(code);
        match self.codes.get_mut(&key) {
            Some(mut entry) => {
                let promo = entry.value_mut();
                if promo.is_exhausted() {
                    warn!(code = %key, "Promo code exhausted between validation and confirmation");
                } else {
                    promo.use_count += 1;
                }
            }
            None => warn!(code = %key, "Recording use of unknown promo code"),
        }
    }
}

impl Default for PromoStore {
    fn default() -> Self {
        Self::new()
    }
}
