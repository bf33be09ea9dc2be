/*!
Publishing jobs for out-of-process consumers
*/
use sqlx::PgPool;

use crate::{Result, LOG};

#[async_trait::async_trait]
pub trait Producer: Send + Sync {
    /// Fire-and-forget, returns once the message is accepted
    async fn publish(&self, topic: &str, payload: String) -> Result<()>;
}

/// Postgres backed queue. Messages are appended to `message_queue`
/// for consumers that poll, and announced with `pg_notify` on a
/// channel named after the topic for consumers that `listen`.
pub struct PgProducer {
    pool: PgPool,
}

impl PgProducer {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Producer for PgProducer {
    async fn publish(&self, topic: &str, payload: String) -> Result<()> {
        let (id,): (i64,) = sqlx::query_as(
            "
            insert into message_queue (topic, payload)
            values ($1, $2)
            returning id
            ",
        )
        .bind(topic)
        .bind(&payload)
        .fetch_one(&self.pool)
        .await?;
        sqlx::query("select pg_notify($1, $2)")
            .bind(topic)
            .bind(&payload)
            .execute(&self.pool)
            .await?;
        slog::info!(LOG, "published message"; "topic" => topic, "message_id" => id);
        Ok(())
    }
}
