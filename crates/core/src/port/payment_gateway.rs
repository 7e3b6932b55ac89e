// Payment Gateway Port
// Abstraction over the external order-creation API. Signature verification
// is done locally (application/payment.rs); only order creation crosses
// this boundary.

use crate::error::{AppError, Result};
use async_trait::async_trait;

/// Order creation request (amounts in minor currency units, e.g. paise)
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub amount_minor: i64,
    pub currency: String,
    pub receipt: String,
}

/// Order as returned by the gateway
#[derive(Debug, Clone)]
pub struct GatewayOrder {
    pub order_id: String,
    pub amount_minor: i64,
    pub currency: String,
}

/// Payment Gateway trait
///
/// Implementations:
/// - ReceiptOrderGateway (daemon): local order ids, gateway-client slot
/// - mocks::MockPaymentGateway: deterministic ids for tests
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a payment order for the given amount
    ///
    /// # Errors
    /// - AppError::Gateway when the upstream call fails
    async fn create_order(&self, request: OrderRequest) -> Result<GatewayOrder>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    /// Mock gateway producing sequential order ids (order-1, order-2, ...)
    pub struct MockPaymentGateway {
        counter: AtomicU64,
        fail_with: Mutex<Option<String>>,
    }

    impl MockPaymentGateway {
        pub fn new() -> Self {
            Self {
                counter: AtomicU64::new(1),
                fail_with: Mutex::new(None),
            }
        }

        pub fn new_failing(message: impl Into<String>) -> Self {
            Self {
                counter: AtomicU64::new(1),
                fail_with: Mutex::new(Some(message.into())),
            }
        }
    }

    impl Default for MockPaymentGateway {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl PaymentGateway for MockPaymentGateway {
        async fn create_order(&self, request: OrderRequest) -> Result<GatewayOrder> {
            if let Some(msg) = self.fail_with.lock().unwrap().clone() {
                return Err(AppError::Gateway(msg));
            }

            let n = self.counter.fetch_add(1, Ordering::SeqCst);
            Ok(GatewayOrder {
                order_id: format!("order-{}", n),
                amount_minor: request.amount_minor,
                currency: request.currency,
            })
        }
    }
}
