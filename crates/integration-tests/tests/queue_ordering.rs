//! Queue Ordering Integration Tests
//!
//! Priority tiers first, strict FIFO inside a tier, per-machine isolation.

use std::sync::Arc;

use printvend_core::application::jobs::CreateJobRequest;
use printvend_core::application::{EventHub, JobService, MachineService, SessionRegistry};
use printvend_core::domain::JobStatus;
use printvend_core::port::id_provider::SequentialIdProvider;
use printvend_core::port::time_provider::TickingTimeProvider;
use printvend_infra_sqlite::{
    create_pool, run_migrations, SqliteJobRepository, SqliteMachineRepository,
};

struct Ctx {
    jobs: Arc<JobService>,
    machines: Arc<MachineService>,
}

async fn setup() -> Ctx {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();

    // Each clock read advances 10ms, so creation order is unambiguous
    let time_provider = Arc::new(TickingTimeProvider::new(1_000, 10));
    let id_provider = Arc::new(SequentialIdProvider::new("job"));
    let job_repo = Arc::new(SqliteJobRepository::new(pool.clone()));
    let machine_repo = Arc::new(SqliteMachineRepository::new(pool));
    let events = Arc::new(EventHub::new());
    let sessions = Arc::new(SessionRegistry::new());

    let jobs = Arc::new(JobService::new(
        job_repo,
        machine_repo.clone(),
        id_provider.clone(),
        time_provider.clone(),
        events.clone(),
    ));

    let machines = Arc::new(MachineService::new(
        machine_repo,
        sessions,
        id_provider,
        time_provider,
        events,
        "https://print.example",
    ));

    Ctx { jobs, machines }
}

fn job_request(machine_key: &str, user: &str, priority: i32) -> CreateJobRequest {
    CreateJobRequest {
        machine_key: machine_key.to_string(),
        user_name: user.to_string(),
        file_url: "https://files.example/doc.pdf".to_string(),
        file_name: "doc.pdf".to_string(),
        total_pages: 10,
        pages_spec: "1-5".to_string(),
        priority,
    }
}

#[tokio::test]
async fn urgent_jobs_jump_ahead_of_normal_fifo() {
    let ctx = setup().await;
    ctx.machines
        .register("M1", "Kiosk", "Lobby", None)
        .await
        .unwrap();

    let a = ctx.jobs.create_job(job_request("M1", "alice", 2)).await.unwrap();
    let b = ctx.jobs.create_job(job_request("M1", "bob", 2)).await.unwrap();
    let c = ctx.jobs.create_job(job_request("M1", "carol", 1)).await.unwrap();

    assert_eq!(a.queue_position, 1);
    assert_eq!(b.queue_position, 2);
    // Urgent lands ahead of both normal jobs
    assert_eq!(c.queue_position, 1);
    assert_eq!(c.queue_length, 3);

    let queue = ctx.jobs.machine_queue("M1").await.unwrap();
    let ids: Vec<&str> = queue.iter().map(|j| j.id.as_str()).collect();
    assert_eq!(ids, vec![c.job.id.as_str(), a.job.id.as_str(), b.job.id.as_str()]);
}

#[tokio::test]
async fn equal_priority_is_strictly_fifo() {
    let ctx = setup().await;
    ctx.machines
        .register("M1", "Kiosk", "Lobby", None)
        .await
        .unwrap();

    let mut expected = Vec::new();
    for user in ["u1", "u2", "u3", "u4", "u5"] {
        let created = ctx.jobs.create_job(job_request("M1", user, 2)).await.unwrap();
        expected.push(created.job.id);
    }

    let queue = ctx.jobs.machine_queue("M1").await.unwrap();
    let ids: Vec<String> = queue.into_iter().map(|j| j.id).collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn urgent_jobs_keep_fifo_among_themselves() {
    let ctx = setup().await;
    ctx.machines
        .register("M1", "Kiosk", "Lobby", None)
        .await
        .unwrap();

    let u1 = ctx.jobs.create_job(job_request("M1", "alice", 1)).await.unwrap();
    let _n = ctx.jobs.create_job(job_request("M1", "bob", 2)).await.unwrap();
    let u2 = ctx.jobs.create_job(job_request("M1", "carol", 1)).await.unwrap();

    let queue = ctx.jobs.machine_queue("M1").await.unwrap();
    assert_eq!(queue[0].id, u1.job.id);
    assert_eq!(queue[1].id, u2.job.id);
}

#[tokio::test]
async fn finished_jobs_free_up_positions() {
    let ctx = setup().await;
    ctx.machines
        .register("M1", "Kiosk", "Lobby", None)
        .await
        .unwrap();

    let a = ctx.jobs.create_job(job_request("M1", "alice", 2)).await.unwrap();
    let b = ctx.jobs.create_job(job_request("M1", "bob", 2)).await.unwrap();

    ctx.jobs
        .update_status(&a.job.id, JobStatus::Printing, None)
        .await
        .unwrap();
    ctx.jobs
        .update_status(&a.job.id, JobStatus::Completed, None)
        .await
        .unwrap();

    let queue = ctx.jobs.machine_queue("M1").await.unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].id, b.job.id);
}

#[tokio::test]
async fn queues_are_isolated_per_machine() {
    let ctx = setup().await;
    ctx.machines
        .register("M1", "Kiosk A", "Lobby", None)
        .await
        .unwrap();
    ctx.machines
        .register("M2", "Kiosk B", "Annex", None)
        .await
        .unwrap();

    ctx.jobs.create_job(job_request("M1", "alice", 1)).await.unwrap();
    let b = ctx.jobs.create_job(job_request("M2", "bob", 2)).await.unwrap();

    // The urgent job on M1 does not affect M2's queue
    assert_eq!(b.queue_position, 1);
    assert_eq!(ctx.jobs.machine_queue("M2").await.unwrap().len(), 1);
}

#[tokio::test]
async fn urgent_costs_half_again_as_much() {
    let ctx = setup().await;
    ctx.machines
        .register("M1", "Kiosk", "Lobby", Some(2.0))
        .await
        .unwrap();

    // 5 pages at 2.0/page
    let normal = ctx.jobs.create_job(job_request("M1", "alice", 2)).await.unwrap();
    let urgent = ctx.jobs.create_job(job_request("M1", "bob", 1)).await.unwrap();

    assert_eq!(normal.job.cost, 10.0);
    assert_eq!(urgent.job.cost, 15.0);
}
