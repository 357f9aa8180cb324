//! User queries. They take a bare connection so that the same call works on
//! a pooled connection and inside an open transaction.

use sqlx::SqliteConnection;

use crate::domain::access::models::User;

pub(super) async fn insert_user(
    conn: &mut SqliteConnection,
    user: &User,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO users (id, email, password_hash, valid)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(user.id.as_str())
    .bind(user.email.as_str())
    .bind(&user.password_hash)
    .bind(user.valid)
    .execute(conn)
    .await?;

    Ok(())
}

/// Id and password hash of the user whose id or email equals `identifier`.
///
/// An id match wins when one user's id equals another user's email.
pub(super) async fn find_credentials(
    conn: &mut SqliteConnection,
    identifier: &str,
) -> Result<Option<(String, String)>, sqlx::Error> {
    sqlx::query_as::<_, (String, String)>(
        r#"
        SELECT id, password_hash
        FROM users
        WHERE id = ? OR email = ?
        ORDER BY id = ? DESC
        LIMIT 1
        "#,
    )
    .bind(identifier)
    .bind(identifier)
    .bind(identifier)
    .fetch_optional(conn)
    .await
}

/// Id and password hash of the user registered with `email`.
pub(super) async fn find_credentials_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Option<(String, String)>, sqlx::Error> {
    sqlx::query_as::<_, (String, String)>(
        r#"
        SELECT id, password_hash
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(conn)
    .await
}
