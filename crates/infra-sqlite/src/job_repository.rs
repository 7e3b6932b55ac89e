// SQLite JobRepository Implementation

use async_trait::async_trait;
use printvend_core::domain::{JobId, JobStatus, PaymentStatus, PrintJob, Priority};
use printvend_core::error::{AppError, Result};
use printvend_core::port::JobRepository;
use sqlx::SqlitePool;

// Helper to convert sqlx::Error to AppError with structured information
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            if let Some(code) = db_err.code() {
                let code_str = code.as_ref();

                // SQLite error codes: https://www.sqlite.org/rescode.html
                match code_str {
                    "2067" | "1555" => AppError::Database(format!(
                        "Unique constraint violation: {} ({})",
                        db_err.message(),
                        code_str
                    )),
                    "5" => AppError::Database(format!(
                        "Database locked (SQLITE_BUSY): {}",
                        db_err.message()
                    )),
                    "13" => AppError::Database(format!("Database full: {}", db_err.message())),
                    _ => AppError::Database(format!(
                        "Database error [{}]: {}",
                        code_str,
                        db_err.message()
                    )),
                }
            } else {
                AppError::Database(format!("Database error: {}", db_err.message()))
            }
        }
        sqlx::Error::RowNotFound => AppError::Database("Row not found".to_string()),
        sqlx::Error::ColumnNotFound(col) => {
            AppError::Database(format!("Column not found: {}", col))
        }
        _ => AppError::Database(err.to_string()),
    }
}

pub struct SqliteJobRepository {
    pool: SqlitePool,
}

impl SqliteJobRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRepository for SqliteJobRepository {
    async fn insert(&self, job: &PrintJob) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO jobs (
                id, machine_key, user_name,
                file_url, file_name, total_pages, pages_spec, pages_count,
                priority, status, cost, error,
                payment_status, payment_id, order_id, paid_at,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&job.id)
        .bind(&job.machine_key)
        .bind(&job.user_name)
        .bind(&job.file_url)
        .bind(&job.file_name)
        .bind(job.total_pages as i64)
        .bind(&job.pages_spec)
        .bind(job.pages_count as i64)
        .bind(job.priority.as_i32())
        .bind(job.status.to_string())
        .bind(job.cost)
        .bind(&job.error)
        .bind(job.payment_status.to_string())
        .bind(&job.payment_id)
        .bind(&job.order_id)
        .bind(job.paid_at)
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &JobId) -> Result<Option<PrintJob>> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(|r| r.into_job()))
    }

    async fn update(&self, job: &PrintJob) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE jobs
            SET status = ?, error = ?,
                payment_status = ?, payment_id = ?, order_id = ?, paid_at = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(job.status.to_string())
        .bind(&job.error)
        .bind(job.payment_status.to_string())
        .bind(&job.payment_id)
        .bind(&job.order_id)
        .bind(job.paid_at)
        .bind(job.updated_at)
        .bind(&job.id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn active_for_machine(&self, machine_key: &str) -> Result<Vec<PrintJob>> {
        let rows: Vec<JobRow> = sqlx::query_as(
            r#"
            SELECT * FROM jobs
            WHERE machine_key = ? AND status IN ('queued', 'printing')
            ORDER BY priority ASC, created_at ASC, id ASC
            "#,
        )
        .bind(machine_key)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(|row| row.into_job()).collect())
    }

    async fn set_order_id(&self, id: &JobId, order_id: &str, now_millis: i64) -> Result<()> {
        let result = sqlx::query("UPDATE jobs SET order_id = ?, updated_at = ? WHERE id = ?")
            .bind(order_id)
            .bind(now_millis)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Job {} not found", id)));
        }
        Ok(())
    }

    async fn mark_paid(&self, id: &JobId, payment_id: &str, now_millis: i64) -> Result<bool> {
        // Conditional update: only a pending job flips to paid. A repeated
        // verification matches zero rows, leaving payment_id and paid_at
        // from the first call untouched.
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET payment_status = 'paid', payment_id = ?, paid_at = ?, updated_at = ?
            WHERE id = ? AND payment_status = 'pending'
            "#,
        )
        .bind(payment_id)
        .bind(now_millis)
        .bind(now_millis)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        // Distinguish "already paid" from "no such job"
        let exists: Option<String> =
            sqlx::query_scalar("SELECT payment_status FROM jobs WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        match exists {
            None => Err(AppError::NotFound(format!("Job {} not found", id))),
            Some(_) => Ok(false),
        }
    }

    async fn count_by_status(&self, status: JobStatus) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE status = ?")
            .bind(status.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(count)
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct JobRow {
    id: String,
    machine_key: String,
    user_name: String,
    file_url: String,
    file_name: String,
    total_pages: i64,
    pages_spec: String,
    pages_count: i64,
    priority: i32,
    status: String,
    cost: f64,
    error: Option<String>,
    payment_status: String,
    payment_id: Option<String>,
    order_id: Option<String>,
    paid_at: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl JobRow {
    fn into_job(self) -> PrintJob {
        let status = self.status.parse().unwrap_or(JobStatus::Failed);

        let payment_status = match self.payment_status.as_str() {
            "paid" => PaymentStatus::Paid,
            _ => PaymentStatus::Pending,
        };

        let priority = Priority::try_from(self.priority).unwrap_or(Priority::Normal);

        PrintJob {
            id: self.id,
            machine_key: self.machine_key,
            user_name: self.user_name,
            file_url: self.file_url,
            file_name: self.file_name,
            total_pages: self.total_pages as u32,
            pages_spec: self.pages_spec,
            pages_count: self.pages_count as u32,
            priority,
            status,
            cost: self.cost,
            payment_status,
            payment_id: self.payment_id,
            order_id: self.order_id,
            paid_at: self.paid_at,
            error: self.error,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};

    async fn setup_test_db() -> SqlitePool {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = SqliteJobRepository::new(setup_test_db().await);

        let job = PrintJob::new_test("M1", Priority::Normal);
        repo.insert(&job).await.unwrap();

        let found = repo.find_by_id(&job.id).await.unwrap().unwrap();
        assert_eq!(found.id, job.id);
        assert_eq!(found.status, JobStatus::Queued);
        assert_eq!(found.payment_status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_active_for_machine_orders_by_priority_then_fifo() {
        let repo = SqliteJobRepository::new(setup_test_db().await);

        let mut normal_early = PrintJob::new_test("M1", Priority::Normal);
        normal_early.created_at = 100;
        let mut urgent_late = PrintJob::new_test("M1", Priority::Urgent);
        urgent_late.created_at = 900;
        let mut normal_late = PrintJob::new_test("M1", Priority::Normal);
        normal_late.created_at = 500;

        repo.insert(&normal_early).await.unwrap();
        repo.insert(&urgent_late).await.unwrap();
        repo.insert(&normal_late).await.unwrap();

        // A job on another machine must not appear
        let other = PrintJob::new_test("M2", Priority::Urgent);
        repo.insert(&other).await.unwrap();

        let queue = repo.active_for_machine("M1").await.unwrap();
        let ids: Vec<&str> = queue.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                urgent_late.id.as_str(),
                normal_early.id.as_str(),
                normal_late.id.as_str()
            ]
        );
    }

    #[tokio::test]
    async fn test_completed_jobs_leave_the_queue() {
        let repo = SqliteJobRepository::new(setup_test_db().await);

        let mut job = PrintJob::new_test("M1", Priority::Normal);
        repo.insert(&job).await.unwrap();

        job.begin_printing(2000).unwrap();
        repo.update(&job).await.unwrap();
        assert_eq!(repo.active_for_machine("M1").await.unwrap().len(), 1);

        job.complete(3000).unwrap();
        repo.update(&job).await.unwrap();
        assert!(repo.active_for_machine("M1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mark_paid_is_idempotent() {
        let repo = SqliteJobRepository::new(setup_test_db().await);

        let job = PrintJob::new_test("M1", Priority::Normal);
        repo.insert(&job).await.unwrap();

        assert!(repo.mark_paid(&job.id, "pay-1", 5000).await.unwrap());

        // Second call changes nothing
        assert!(!repo.mark_paid(&job.id, "pay-2", 9000).await.unwrap());

        let found = repo.find_by_id(&job.id).await.unwrap().unwrap();
        assert_eq!(found.payment_status, PaymentStatus::Paid);
        assert_eq!(found.payment_id.as_deref(), Some("pay-1"));
        assert_eq!(found.paid_at, Some(5000));
    }

    #[tokio::test]
    async fn test_mark_paid_unknown_job_is_not_found() {
        let repo = SqliteJobRepository::new(setup_test_db().await);
        let err = repo
            .mark_paid(&"missing".to_string(), "pay-1", 1000)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_count_by_status() {
        let repo = SqliteJobRepository::new(setup_test_db().await);

        for _ in 0..3 {
            repo.insert(&PrintJob::new_test("M1", Priority::Normal))
                .await
                .unwrap();
        }

        assert_eq!(repo.count_by_status(JobStatus::Queued).await.unwrap(), 3);
        assert_eq!(repo.count_by_status(JobStatus::Printing).await.unwrap(), 0);
    }
}
