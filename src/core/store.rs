use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};

use crate::core::error::{ConfigError, Error};
use crate::types::{Feedback, FeedbackChanges, NewFeedback, NewUser, User};

/// Outcome of an insert that can collide with a unique constraint.
#[derive(Debug, PartialEq)]
pub(crate) enum Insert<T> {
    Created(T),
    Conflict(Taken),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Taken {
    Username,
    Email,
}

#[async_trait]
pub(crate) trait Store: Send + Sync + std::fmt::Debug {
    async fn insert_user(&self, user: NewUser) -> Result<Insert<User>, Error>;

    async fn get_user(&self, username: &str) -> Result<Option<User>, Error>;

    /// Deletes the user and, through the foreign key, all of their feedback.
    async fn delete_user(&self, username: &str) -> Result<bool, Error>;

    async fn get_feedback_by_user(&self, username: &str) -> Result<Vec<Feedback>, Error>;

    async fn insert_feedback(&self, feedback: NewFeedback) -> Result<Feedback, Error>;

    async fn get_feedback(&self, id: i32) -> Result<Option<Feedback>, Error>;

    async fn update_feedback(
        &self,
        id: i32,
        changes: FeedbackChanges,
    ) -> Result<Option<Feedback>, Error>;

    async fn delete_feedback(&self, id: i32) -> Result<bool, Error>;
}

#[derive(Clone, Debug)]
pub(crate) struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub(crate) async fn connect(
        database_url: &str,
        max_connections: u32,
    ) -> Result<Self, ConfigError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        sqlx::migrate!().run(&pool).await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_user(&self, user: NewUser) -> Result<Insert<User>, Error> {
        match sqlx::query(
            "INSERT INTO users (username, password, email, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5);",
        )
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .execute(&self.pool)
        .await
        {
            Ok(_) => Ok(Insert::Created(user.into())),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                match db_err.constraint() {
                    Some("users_email_key") => Ok(Insert::Conflict(Taken::Email)),
                    _ => Ok(Insert::Conflict(Taken::Username)),
                }
            }
            Err(e) => Err(Error::Sql(e)),
        }
    }

    async fn get_user(&self, username: &str) -> Result<Option<User>, Error> {
        match sqlx::query(
            "SELECT username, password, email, first_name, last_name
            FROM users
            WHERE username = $1;",
        )
        .bind(username)
        .map(map_user)
        .fetch_one(&self.pool)
        .await
        {
            Ok(user) => Ok(Some(user)),
            Err(sqlx::Error::RowNotFound) => Ok(None),
            Err(e) => Err(Error::Sql(e)),
        }
    }

    async fn delete_user(&self, username: &str) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM users WHERE username = $1;")
            .bind(username)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_feedback_by_user(&self, username: &str) -> Result<Vec<Feedback>, Error> {
        let feedback = sqlx::query(
            "SELECT id, title, content, username, created_at
            FROM feedback
            WHERE username = $1
            ORDER BY created_at DESC, id DESC;",
        )
        .bind(username)
        .map(map_feedback)
        .fetch_all(&self.pool)
        .await?;

        Ok(feedback)
    }

    async fn insert_feedback(&self, feedback: NewFeedback) -> Result<Feedback, Error> {
        let feedback = sqlx::query(
            "INSERT INTO feedback (title, content, username) VALUES ($1, $2, $3) RETURNING
                id,
                title,
                content,
                username,
                created_at;",
        )
        .bind(&feedback.title)
        .bind(&feedback.content)
        .bind(&feedback.username)
        .map(map_feedback)
        .fetch_one(&self.pool)
        .await?;

        Ok(feedback)
    }

    async fn get_feedback(&self, id: i32) -> Result<Option<Feedback>, Error> {
        match sqlx::query(
            "SELECT id, title, content, username, created_at
            FROM feedback
            WHERE id = $1;",
        )
        .bind(id)
        .map(map_feedback)
        .fetch_one(&self.pool)
        .await
        {
            Ok(feedback) => Ok(Some(feedback)),
            Err(sqlx::Error::RowNotFound) => Ok(None),
            Err(e) => Err(Error::Sql(e)),
        }
    }

    async fn update_feedback(
        &self,
        id: i32,
        changes: FeedbackChanges,
    ) -> Result<Option<Feedback>, Error> {
        match sqlx::query(
            "UPDATE feedback SET title = $1, content = $2 WHERE id = $3 RETURNING
                id,
                title,
                content,
                username,
                created_at;",
        )
        .bind(&changes.title)
        .bind(&changes.content)
        .bind(id)
        .map(map_feedback)
        .fetch_one(&self.pool)
        .await
        {
            Ok(feedback) => Ok(Some(feedback)),
            Err(sqlx::Error::RowNotFound) => Ok(None),
            Err(e) => Err(Error::Sql(e)),
        }
    }

    async fn delete_feedback(&self, id: i32) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM feedback WHERE id = $1;")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_user(row: PgRow) -> User {
    User {
        username: row.get("username"),
        password: row.get("password"),
        email: row.get("email"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
    }
}

fn map_feedback(row: PgRow) -> Feedback {
    Feedback {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        username: row.get("username"),
        created_at: row.get("created_at"),
    }
}
