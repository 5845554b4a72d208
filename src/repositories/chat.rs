use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;
use crate::{error::Result, models::chat::ChatMessage};

fn row_to_message(row: &Row) -> Result<ChatMessage> {
    Ok(ChatMessage {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        prompt: row.try_get("prompt")?,
        response: row.try_get("response")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Persists a prompt/response exchange.
pub async fn insert(
    pool: &Pool,
    id: Uuid,
    user_id: &Uuid,
    prompt: &str,
    response: &str,
) -> Result<ChatMessage> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO chat_messages (id, user_id, prompt, response)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
            &[&id, user_id, &prompt, &response],
        )
        .await?;
    row_to_message(&row)
}

/// Counts all stored exchanges across users (drives the global cap).
pub async fn count_all(pool: &Pool) -> Result<i64> {
    let client = pool.get().await?;
    let row = client.query_one("SELECT COUNT(*) FROM chat_messages", &[]).await?;
    Ok(row.try_get(0)?)
}

/// Counts a single user's stored exchanges.
pub async fn count_for_user(pool: &Pool, user_id: &Uuid) -> Result<i64> {
    let client = pool.get().await?;
    let row = client
        .query_one("SELECT COUNT(*) FROM chat_messages WHERE user_id = $1", &[user_id])
        .await?;
    Ok(row.try_get(0)?)
}

/// A page of a user's history, newest first.
pub async fn list_page_for_user(
    pool: &Pool,
    user_id: &Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<ChatMessage>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT * FROM chat_messages
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            &[user_id, &limit, &offset],
        )
        .await?;
    rows.iter().map(row_to_message).collect()
}
