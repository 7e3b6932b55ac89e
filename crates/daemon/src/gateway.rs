//! Local order gateway
//!
//! Mints order ids in-process instead of calling out to a hosted checkout
//! API. The daemon never talks to the processor directly anyway: the
//! client-side checkout does, and the processor's signed confirmation comes
//! back through payment.verify.v1. Swapping in a real gateway client only
//! touches this file.

use async_trait::async_trait;
use printvend_core::error::Result;
use printvend_core::port::{GatewayOrder, IdProvider, OrderRequest, PaymentGateway};
use std::sync::Arc;

pub struct ReceiptOrderGateway {
    id_provider: Arc<dyn IdProvider>,
}

impl ReceiptOrderGateway {
    pub fn new(id_provider: Arc<dyn IdProvider>) -> Self {
        Self { id_provider }
    }
}

#[async_trait]
impl PaymentGateway for ReceiptOrderGateway {
    async fn create_order(&self, request: OrderRequest) -> Result<GatewayOrder> {
        Ok(GatewayOrder {
            order_id: format!("order_{}", self.id_provider.generate_id()),
            amount_minor: request.amount_minor,
            currency: request.currency,
        })
    }
}
