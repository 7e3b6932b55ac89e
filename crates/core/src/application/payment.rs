// Payment Service - order creation and HMAC signature verification
//
// The gateway signs its confirmation as
// HMAC-SHA-256(secret, "{order_id}|{payment_id}"), hex-encoded. We hold the
// same secret and recompute; a request is accepted only on an exact match.

use std::sync::Arc;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::info;

use crate::application::events::{EventHub, MachineEvent};
use crate::domain::{JobId, PaymentStatus, PrintJob};
use crate::error::{AppError, Result};
use crate::port::{JobRepository, OrderRequest, PaymentGateway, TimeProvider};

type HmacSha256 = Hmac<Sha256>;

/// Order created for a job, ready to hand to the client-side checkout
#[derive(Debug, Clone)]
pub struct PaymentOrder {
    pub job_id: JobId,
    pub order_id: String,
    pub amount_minor: i64,
    pub currency: String,
}

pub struct PaymentService {
    jobs: Arc<dyn JobRepository>,
    gateway: Arc<dyn PaymentGateway>,
    time_provider: Arc<dyn TimeProvider>,
    events: Arc<EventHub>,
    secret: Vec<u8>,
}

impl PaymentService {
    pub fn new(
        jobs: Arc<dyn JobRepository>,
        gateway: Arc<dyn PaymentGateway>,
        time_provider: Arc<dyn TimeProvider>,
        events: Arc<EventHub>,
        secret: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            jobs,
            gateway,
            time_provider,
            events,
            secret: secret.into(),
        }
    }

    /// Create a gateway order for an unpaid job. Amount is the fixed job
    /// cost converted to minor units.
    pub async fn create_order(&self, job_id: &JobId) -> Result<PaymentOrder> {
        let job = self.find_job(job_id).await?;

        if job.payment_status == PaymentStatus::Paid {
            return Err(AppError::Precondition(format!(
                "Job {} is already paid",
                job_id
            )));
        }

        let amount_minor = (job.cost * 100.0).round() as i64;
        let order = self
            .gateway
            .create_order(OrderRequest {
                amount_minor,
                currency: "INR".to_string(),
                receipt: format!("job_{}", job.id),
            })
            .await?;

        let now = self.time_provider.now_millis();
        self.jobs.set_order_id(job_id, &order.order_id, now).await?;

        info!(job_id = %job.id, order_id = %order.order_id, amount_minor, "Payment order created");

        Ok(PaymentOrder {
            job_id: job.id,
            order_id: order.order_id,
            amount_minor: order.amount_minor,
            currency: order.currency,
        })
    }

    /// Verify a signed payment confirmation and mark the job paid.
    ///
    /// Idempotent: verifying an already-paid job with a valid signature
    /// succeeds without touching payment_id or paid_at again. A signature
    /// mismatch is an authentication failure with no state change.
    pub async fn verify(
        &self,
        job_id: &JobId,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<PrintJob> {
        if order_id.is_empty() || payment_id.is_empty() || signature.is_empty() {
            return Err(AppError::Validation("Missing payment details".into()));
        }

        if !signature_matches(&self.secret, order_id, payment_id, signature) {
            return Err(AppError::Authentication("Invalid payment signature".into()));
        }

        // Signature checked before we touch the job, so a forged request
        // never reads state it should not
        let job = self.find_job(job_id).await?;

        let now = self.time_provider.now_millis();
        let newly_paid = self.jobs.mark_paid(job_id, payment_id, now).await?;

        if newly_paid {
            info!(job_id = %job.id, payment_id, "Payment verified");
            self.events.publish(
                &job.machine_key,
                MachineEvent::JobPaid {
                    job_id: job.id.clone(),
                    payment_status: PaymentStatus::Paid,
                },
            );
        } else {
            info!(job_id = %job.id, "Payment re-verified; already paid");
        }

        self.find_job(job_id).await
    }

    async fn find_job(&self, job_id: &JobId) -> Result<PrintJob> {
        self.jobs
            .find_by_id(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {} not found", job_id)))
    }
}

/// Hex-encoded HMAC-SHA-256 over `"{order_id}|{payment_id}"`
pub fn expected_signature(secret: &[u8], order_id: &str, payment_id: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret).expect("HMAC-SHA-256 accepts keys of any size");
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time signature check via the hmac crate's verifier
pub fn signature_matches(secret: &[u8], order_id: &str, payment_id: &str, supplied: &str) -> bool {
    let Ok(supplied_bytes) = hex::decode(supplied) else {
        return false;
    };

    let mut mac =
        HmacSha256::new_from_slice(secret).expect("HMAC-SHA-256 accepts keys of any size");
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    mac.verify_slice(&supplied_bytes).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-payment-secret";

    #[test]
    fn valid_signature_matches() {
        let sig = expected_signature(SECRET, "order-1", "pay-1");
        assert!(signature_matches(SECRET, "order-1", "pay-1", &sig));
    }

    #[test]
    fn any_single_character_mutation_is_rejected() {
        let sig = expected_signature(SECRET, "order-1", "pay-1");

        for i in 0..sig.len() {
            let mut forged: Vec<char> = sig.chars().collect();
            forged[i] = if forged[i] == '0' { '1' } else { '0' };
            let forged: String = forged.into_iter().collect();
            assert!(
                !signature_matches(SECRET, "order-1", "pay-1", &forged),
                "mutation at index {} was accepted",
                i
            );
        }
    }

    #[test]
    fn signature_binds_order_and_payment_ids() {
        let sig = expected_signature(SECRET, "order-1", "pay-1");
        assert!(!signature_matches(SECRET, "order-2", "pay-1", &sig));
        assert!(!signature_matches(SECRET, "order-1", "pay-2", &sig));
    }

    #[test]
    fn non_hex_signature_is_rejected_not_a_panic() {
        assert!(!signature_matches(SECRET, "order-1", "pay-1", "not-hex!"));
        assert!(!signature_matches(SECRET, "order-1", "pay-1", ""));
    }

    #[test]
    fn different_secrets_disagree() {
        let sig = expected_signature(SECRET, "order-1", "pay-1");
        assert!(!signature_matches(b"other-secret", "order-1", "pay-1", &sig));
    }
}
