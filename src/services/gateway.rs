use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::utils::error::AppError;

/// Order handle returned by the external payment provider.
#[derive(Debug, Clone)]
pub struct GatewayOrder {
    pub order_ref: String,
    pub amount: Decimal,
    pub currency: String,
}

/// Boundary to the external payment provider. Only order creation crosses
/// the wire; confirmation arrives back through the signed verification
/// callback handled locally.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(
        &self,
        amount: Decimal,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, AppError>;
}

/// Development/test gateway. Always opens an order; real integrations
/// replace this behind the same trait.
#[derive(Clone, Debug, Default)]
pub struct MockGateway;

impl MockGateway {
    pub fn new() -> Self {
        Self
    }

    pub fn shared() -> Arc<dyn PaymentGateway> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_order(
        &self,
        amount: Decimal,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, AppError> {
        // Simulate provider latency
        tokio::time::sleep(tokio::time::Duration::from_millis(25)).await;

        let order_ref = format!("order_{}", Uuid::new_v4().simple());

        tracing::info!(
            order_ref = %order_ref,
            amount = %amount,
            currency = %currency,
            receipt = %receipt,
            "Gateway order opened"
        );

        Ok(GatewayOrder {
            order_ref,
            amount,
            currency: currency.to_string(),
        })
    }
}
