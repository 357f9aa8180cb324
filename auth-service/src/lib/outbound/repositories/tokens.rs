//! Token queries, callable on a pooled connection or an open transaction.
//!
//! Instants are stored as Unix milliseconds.

use auth::Token;
use chrono::DateTime;
use chrono::Utc;
use sqlx::SqliteConnection;

use crate::domain::access::models::UserId;
use crate::domain::access::models::ValidityWindow;

pub(super) async fn insert_token(
    conn: &mut SqliteConnection,
    token: &Token,
    user_id: &UserId,
    window: &ValidityWindow,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO tokens (token, user_id, start_time, end_time)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(token.as_bytes().as_slice())
    .bind(user_id.as_str())
    .bind(window.start().timestamp_millis())
    .bind(window.end().timestamp_millis())
    .execute(conn)
    .await?;

    Ok(())
}

/// Owner of `token` if a row exists whose window contains `now`.
pub(super) async fn find_live_owner(
    conn: &mut SqliteConnection,
    token: &Token,
    now: DateTime<Utc>,
) -> Result<Option<String>, sqlx::Error> {
    let now = now.timestamp_millis();

    sqlx::query_scalar::<_, String>(
        r#"
        SELECT user_id
        FROM tokens
        WHERE token = ?
          AND start_time <= ?
          AND end_time >= ?
        "#,
    )
    .bind(token.as_bytes().as_slice())
    .bind(now)
    .bind(now)
    .fetch_optional(conn)
    .await
}

pub(super) async fn delete_ended_before(
    conn: &mut SqliteConnection,
    cutoff: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM tokens
        WHERE end_time < ?
        "#,
    )
    .bind(cutoff.timestamp_millis())
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}
