use sqlx::SqliteConnection;

use crate::db_types::{NewUser, User};

pub async fn fetch_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as("SELECT * FROM users WHERE id = $1").bind(user_id).fetch_all(conn).await?.pop();
    Ok(user)
}

pub async fn fetch_user_by_email(email: &str, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as("SELECT * FROM users WHERE email = $1").bind(email).fetch_all(conn).await?.pop();
    Ok(user)
}

pub async fn insert_user(user: NewUser, conn: &mut SqliteConnection) -> Result<User, sqlx::Error> {
    let user = sqlx::query_as("INSERT INTO users (email, name) VALUES ($1, $2) RETURNING *")
        .bind(user.email)
        .bind(user.name)
        .fetch_all(conn)
        .await?
        .pop()
        .ok_or(sqlx::Error::RowNotFound)?;
    Ok(user)
}
