// SQLite MachineRepository Implementation

use async_trait::async_trait;
use printvend_core::domain::{Machine, MachineKey, MachineStatus};
use printvend_core::error::{AppError, Result};
use printvend_core::port::MachineRepository;
use sqlx::SqlitePool;

use crate::job_repository::map_sqlx_error;

pub struct SqliteMachineRepository {
    pool: SqlitePool,
}

impl SqliteMachineRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MachineRepository for SqliteMachineRepository {
    async fn upsert(&self, machine: &Machine) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO machines (machine_key, name, location, status, rate_per_page, last_seen_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (machine_key) DO UPDATE SET
                name = excluded.name,
                location = excluded.location,
                status = excluded.status,
                rate_per_page = excluded.rate_per_page,
                last_seen_at = excluded.last_seen_at
            "#,
        )
        .bind(&machine.machine_key)
        .bind(&machine.name)
        .bind(&machine.location)
        .bind(machine.status.to_string())
        .bind(machine.rate_per_page)
        .bind(machine.last_seen_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_key(&self, machine_key: &str) -> Result<Option<Machine>> {
        let row = sqlx::query_as::<_, MachineRow>("SELECT * FROM machines WHERE machine_key = ?")
            .bind(machine_key)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(|r| r.into_machine()))
    }

    async fn update_status(&self, machine_key: &str, status: MachineStatus) -> Result<()> {
        let result = sqlx::query("UPDATE machines SET status = ? WHERE machine_key = ?")
            .bind(status.to_string())
            .bind(machine_key)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Machine {} not found",
                machine_key
            )));
        }
        Ok(())
    }

    async fn touch_last_seen(&self, machine_key: &str, now_millis: i64) -> Result<()> {
        let result = sqlx::query("UPDATE machines SET last_seen_at = ? WHERE machine_key = ?")
            .bind(now_millis)
            .bind(machine_key)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Machine {} not found",
                machine_key
            )));
        }
        Ok(())
    }

    async fn mark_stale_offline(&self, cutoff_millis: i64) -> Result<Vec<MachineKey>> {
        // Printing machines are left alone: the heartbeat pauses while the
        // console drives a job, and the job's terminal transition restores
        // the status anyway.
        let keys: Vec<String> = sqlx::query_scalar(
            r#"
            UPDATE machines
            SET status = 'offline'
            WHERE status = 'online' AND last_seen_at < ?
            RETURNING machine_key
            "#,
        )
        .bind(cutoff_millis)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(keys)
    }

    async fn count_by_status(&self, status: MachineStatus) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM machines WHERE status = ?")
            .bind(status.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(count)
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct MachineRow {
    machine_key: String,
    name: String,
    location: String,
    status: String,
    rate_per_page: f64,
    last_seen_at: i64,
}

impl MachineRow {
    fn into_machine(self) -> Machine {
        let status = self.status.parse().unwrap_or(MachineStatus::Offline);

        Machine {
            machine_key: self.machine_key,
            name: self.name,
            location: self.location,
            status,
            rate_per_page: self.rate_per_page,
            last_seen_at: self.last_seen_at,
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
    async fn test_upsert_and_find() {
        let repo = SqliteMachineRepository::new(setup_test_db().await);

        let machine = Machine::new("M1", "Library Kiosk", "2nd floor", 2.0, 1000);
        repo.upsert(&machine).await.unwrap();

        let found = repo.find_by_key("M1").await.unwrap().unwrap();
        assert_eq!(found.name, "Library Kiosk");
        assert_eq!(found.status, MachineStatus::Online);

        // Re-registration updates in place
        let renamed = Machine::new("M1", "Main Kiosk", "Lobby", 3.0, 2000);
        repo.upsert(&renamed).await.unwrap();

        let found = repo.find_by_key("M1").await.unwrap().unwrap();
        assert_eq!(found.name, "Main Kiosk");
        assert_eq!(found.rate_per_page, 3.0);
        assert_eq!(found.last_seen_at, 2000);
    }

    #[tokio::test]
    async fn test_update_status_unknown_machine() {
        let repo = SqliteMachineRepository::new(setup_test_db().await);
        let err = repo
            .update_status("ghost", MachineStatus::Offline)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_mark_stale_offline() {
        let repo = SqliteMachineRepository::new(setup_test_db().await);

        repo.upsert(&Machine::new("stale", "A", "x", 2.0, 1000))
            .await
            .unwrap();
        repo.upsert(&Machine::new("fresh", "B", "y", 2.0, 9000))
            .await
            .unwrap();

        let mut printing = Machine::new("busy", "C", "z", 2.0, 1000);
        printing.status = MachineStatus::Printing;
        repo.upsert(&printing).await.unwrap();

        let flipped = repo.mark_stale_offline(5000).await.unwrap();
        assert_eq!(flipped, vec!["stale".to_string()]);

        let stale = repo.find_by_key("stale").await.unwrap().unwrap();
        assert_eq!(stale.status, MachineStatus::Offline);
        let busy = repo.find_by_key("busy").await.unwrap().unwrap();
        assert_eq!(busy.status, MachineStatus::Printing);
    }
}
