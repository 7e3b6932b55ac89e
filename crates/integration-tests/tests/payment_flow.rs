//! Payment Flow Integration Tests
//!
//! Order creation, HMAC verification, idempotent re-verification, and the
//! events the flow broadcasts.

use std::sync::Arc;

use printvend_core::application::jobs::CreateJobRequest;
use printvend_core::application::payment::expected_signature;
use printvend_core::application::{
    EventHub, JobService, MachineService, PaymentService, SessionRegistry,
};
use printvend_core::domain::PaymentStatus;
use printvend_core::error::AppError;
use printvend_core::port::id_provider::SequentialIdProvider;
use printvend_core::port::payment_gateway::mocks::MockPaymentGateway;
use printvend_core::port::time_provider::TickingTimeProvider;
use printvend_infra_sqlite::{
    create_pool, run_migrations, SqliteJobRepository, SqliteMachineRepository,
};

const SECRET: &[u8] = b"integration-secret";

struct Ctx {
    jobs: Arc<JobService>,
    machines: Arc<MachineService>,
    payments: Arc<PaymentService>,
    events: Arc<EventHub>,
}

async fn setup() -> Ctx {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();

    let time_provider = Arc::new(TickingTimeProvider::new(1_000, 10));
    let id_provider = Arc::new(SequentialIdProvider::new("job"));
    let job_repo = Arc::new(SqliteJobRepository::new(pool.clone()));
    let machine_repo = Arc::new(SqliteMachineRepository::new(pool));
    let events = Arc::new(EventHub::new());
    let sessions = Arc::new(SessionRegistry::new());

    let jobs = Arc::new(JobService::new(
        job_repo.clone(),
        machine_repo.clone(),
        id_provider.clone(),
        time_provider.clone(),
        events.clone(),
    ));

    let machines = Arc::new(MachineService::new(
        machine_repo,
        sessions,
        id_provider,
        time_provider.clone(),
        events.clone(),
        "https://print.example",
    ));

    let payments = Arc::new(PaymentService::new(
        job_repo,
        Arc::new(MockPaymentGateway::new()),
        time_provider,
        events.clone(),
        SECRET,
    ));

    Ctx {
        jobs,
        machines,
        payments,
        events,
    }
}

async fn create_job(ctx: &Ctx) -> String {
    ctx.machines
        .register("M1", "Kiosk", "Lobby", Some(2.0))
        .await
        .unwrap();

    let created = ctx
        .jobs
        .create_job(CreateJobRequest {
            machine_key: "M1".to_string(),
            user_name: "alice".to_string(),
            file_url: "https://files.example/doc.pdf".to_string(),
            file_name: "doc.pdf".to_string(),
            total_pages: 10,
            pages_spec: "1-5".to_string(),
            priority: 2,
        })
        .await
        .unwrap();
    created.job.id
}

#[tokio::test]
async fn order_carries_the_job_cost_in_minor_units() {
    let ctx = setup().await;
    let job_id = create_job(&ctx).await;

    // 5 pages at 2.0/page, normal priority
    let order = ctx.payments.create_order(&job_id).await.unwrap();
    assert_eq!(order.amount_minor, 1000);
    assert_eq!(order.currency, "INR");
    assert_eq!(order.order_id, "order-1");

    // The order id is stored on the job
    let job = ctx.jobs.job_status(&job_id).await.unwrap();
    assert_eq!(job.order_id.as_deref(), Some("order-1"));
}

#[tokio::test]
async fn valid_signature_marks_the_job_paid() {
    let ctx = setup().await;
    let job_id = create_job(&ctx).await;

    let order = ctx.payments.create_order(&job_id).await.unwrap();
    let signature = expected_signature(SECRET, &order.order_id, "pay-77");

    let job = ctx
        .payments
        .verify(&job_id, &order.order_id, "pay-77", &signature)
        .await
        .unwrap();

    assert_eq!(job.payment_status, PaymentStatus::Paid);
    assert_eq!(job.payment_id.as_deref(), Some("pay-77"));
    assert!(job.paid_at.is_some());
}

#[tokio::test]
async fn re_verification_is_idempotent() {
    let ctx = setup().await;
    let job_id = create_job(&ctx).await;

    let order = ctx.payments.create_order(&job_id).await.unwrap();
    let signature = expected_signature(SECRET, &order.order_id, "pay-77");

    let first = ctx
        .payments
        .verify(&job_id, &order.order_id, "pay-77", &signature)
        .await
        .unwrap();

    // Same confirmation delivered again
    let second = ctx
        .payments
        .verify(&job_id, &order.order_id, "pay-77", &signature)
        .await
        .unwrap();

    assert_eq!(second.payment_status, PaymentStatus::Paid);
    assert_eq!(second.payment_id, first.payment_id);
    assert_eq!(second.paid_at, first.paid_at);
}

#[tokio::test]
async fn forged_signature_is_rejected_without_state_change() {
    let ctx = setup().await;
    let job_id = create_job(&ctx).await;

    let order = ctx.payments.create_order(&job_id).await.unwrap();
    let forged = expected_signature(b"wrong-secret", &order.order_id, "pay-77");

    let err = ctx
        .payments
        .verify(&job_id, &order.order_id, "pay-77", &forged)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Authentication(_)));

    let job = ctx.jobs.job_status(&job_id).await.unwrap();
    assert_eq!(job.payment_status, PaymentStatus::Pending);
    assert_eq!(job.payment_id, None);
}

#[tokio::test]
async fn missing_fields_are_a_validation_error() {
    let ctx = setup().await;
    let job_id = create_job(&ctx).await;

    let err = ctx
        .payments
        .verify(&job_id, "", "pay-77", "deadbeef")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn paid_jobs_reject_new_orders() {
    let ctx = setup().await;
    let job_id = create_job(&ctx).await;

    let order = ctx.payments.create_order(&job_id).await.unwrap();
    let signature = expected_signature(SECRET, &order.order_id, "pay-77");
    ctx.payments
        .verify(&job_id, &order.order_id, "pay-77", &signature)
        .await
        .unwrap();

    let err = ctx.payments.create_order(&job_id).await.unwrap_err();
    assert!(matches!(err, AppError::Precondition(_)));
}

#[tokio::test]
async fn unknown_job_is_not_found() {
    let ctx = setup().await;
    create_job(&ctx).await;

    let signature = expected_signature(SECRET, "order-9", "pay-9");
    let err = ctx
        .payments
        .verify(&"ghost".to_string(), "order-9", "pay-9", &signature)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn first_verification_broadcasts_job_paid_exactly_once() {
    let ctx = setup().await;
    let job_id = create_job(&ctx).await;

    let mut rx = ctx.events.subscribe("M1");

    let order = ctx.payments.create_order(&job_id).await.unwrap();
    let signature = expected_signature(SECRET, &order.order_id, "pay-77");

    ctx.payments
        .verify(&job_id, &order.order_id, "pay-77", &signature)
        .await
        .unwrap();
    ctx.payments
        .verify(&job_id, &order.order_id, "pay-77", &signature)
        .await
        .unwrap();

    let mut paid_events = 0;
    while let Ok(event) = rx.try_recv() {
        let json = serde_json::to_value(&event).unwrap();
        if json["event"] == "job-paid" {
            paid_events += 1;
            assert_eq!(json["job_id"], serde_json::json!(job_id));
        }
    }
    assert_eq!(paid_events, 1);
}
