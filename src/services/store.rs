use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

use crate::models::{Interest, NewUser, User, UserPatch};

/// Errors that can occur when interacting with the database
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Email already registered: {0}")]
    EmailTaken(String),
}

/// Raw user row without its interests
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    age: i64,
    gender: String,
    email: String,
    city: String,
}

impl UserRow {
    fn into_user(self, interests: Vec<Interest>) -> User {
        User {
            id: self.id,
            name: self.name,
            age: self.age,
            gender: self.gender,
            email: self.email,
            city: self.city,
            interests,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct InterestRow {
    id: i64,
    name: String,
}

impl From<InterestRow> for Interest {
    fn from(row: InterestRow) -> Self {
        Interest { id: row.id, name: row.name }
    }
}

/// SQLite-backed store for users and their interests
///
/// Every write runs on a scoped transaction committed at the end of the
/// operation. Email and interest-name uniqueness rest on the schema's UNIQUE
/// constraints; the interest get-or-create is an upsert by natural key, so
/// concurrent writers of the same new name converge on one row.
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    /// Create a new store from a connection string, running migrations
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to database: {}", url);

        Self::new(
            url,
            max_connections.unwrap_or(5),
            min_connections.unwrap_or(1),
        )
        .await
    }

    /// Create a user, lazily resolving its interest names
    ///
    /// Fails with `EmailTaken` if the email is already registered.
    pub async fn create_user(
        &self,
        new_user: NewUser,
        interest_names: &[String],
    ) -> Result<User, StoreError> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
            .bind(&new_user.email)
            .fetch_optional(&mut *tx)
            .await?;

        if existing.is_some() {
            return Err(StoreError::EmailTaken(new_user.email));
        }

        let result = sqlx::query(
            "INSERT INTO users (name, age, gender, email, city) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&new_user.name)
        .bind(new_user.age)
        .bind(&new_user.gender)
        .bind(&new_user.email)
        .bind(&new_user.city)
        .execute(&mut *tx)
        .await?;

        let user_id = result.last_insert_rowid();

        let interests = resolve_interests(&mut tx, interest_names).await?;
        link_interests(&mut tx, user_id, &interests).await?;

        tx.commit().await?;

        tracing::debug!("Created user {} with {} interests", user_id, interests.len());

        Ok(User {
            id: user_id,
            name: new_user.name,
            age: new_user.age,
            gender: new_user.gender,
            email: new_user.email,
            city: new_user.city,
            interests,
        })
    }

    /// Fetch a user by id with interests populated
    pub async fn get_user(&self, id: i64) -> Result<User, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, name, age, gender, email, city FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or_else(|| StoreError::NotFound(format!("user {}", id)))?;

        let interests = interests_for_user(&self.pool, id).await?;
        Ok(row.into_user(interests))
    }

    /// List a page of users in id order
    pub async fn list_users(&self, offset: i64, limit: i64) -> Result<Vec<User>, StoreError> {
        let rows: Vec<UserRow> = sqlx::query_as(
            "SELECT id, name, age, gender, email, city FROM users ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let mut users = Vec::with_capacity(rows.len());
        for row in rows {
            let interests = interests_for_user(&self.pool, row.id).await?;
            users.push(row.into_user(interests));
        }

        Ok(users)
    }

    /// Apply a partial update to a user
    ///
    /// Only supplied fields change. An email change re-checks uniqueness
    /// against all other users; a supplied interests list replaces the full
    /// association set.
    pub async fn update_user(&self, id: i64, patch: UserPatch) -> Result<User, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, name, age, gender, email, city FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let current = row.ok_or_else(|| StoreError::NotFound(format!("user {}", id)))?;

        if let Some(email) = &patch.email {
            if email != &current.email {
                let taken: Option<(i64,)> =
                    sqlx::query_as("SELECT id FROM users WHERE email = ? AND id != ?")
                        .bind(email)
                        .bind(id)
                        .fetch_optional(&mut *tx)
                        .await?;

                if taken.is_some() {
                    return Err(StoreError::EmailTaken(email.clone()));
                }
            }
        }

        let name = patch.name.unwrap_or(current.name);
        let age = patch.age.unwrap_or(current.age);
        let gender = patch.gender.unwrap_or(current.gender);
        let email = patch.email.unwrap_or(current.email);
        let city = patch.city.unwrap_or(current.city);

        sqlx::query("UPDATE users SET name = ?, age = ?, gender = ?, email = ?, city = ? WHERE id = ?")
            .bind(&name)
            .bind(age)
            .bind(&gender)
            .bind(&email)
            .bind(&city)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let interests = match patch.interests {
            Some(names) => {
                sqlx::query("DELETE FROM user_interests WHERE user_id = ?")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;

                let resolved = resolve_interests(&mut tx, &names).await?;
                link_interests(&mut tx, id, &resolved).await?;
                resolved
            }
            None => interests_for_user(&mut *tx, id).await?,
        };

        tx.commit().await?;

        Ok(User { id, name, age, gender, email, city, interests })
    }

    /// Delete a user and its association rows
    ///
    /// Interest rows are never deleted; orphans persist.
    pub async fn delete_user(&self, id: i64) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        if existing.is_none() {
            return Err(StoreError::NotFound(format!("user {}", id)));
        }

        sqlx::query("DELETE FROM user_interests WHERE user_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!("Deleted user {}", id);

        Ok(())
    }

    /// Every user except the subject, interests populated
    ///
    /// This materializes the candidate pool the matching engine filters and
    /// ranks in memory.
    pub async fn list_candidates(&self, exclude_id: i64) -> Result<Vec<User>, StoreError> {
        let rows: Vec<UserRow> = sqlx::query_as(
            "SELECT id, name, age, gender, email, city FROM users WHERE id != ? ORDER BY id",
        )
        .bind(exclude_id)
        .fetch_all(&self.pool)
        .await?;

        let mut users = Vec::with_capacity(rows.len());
        for row in rows {
            let interests = interests_for_user(&self.pool, row.id).await?;
            users.push(row.into_user(interests));
        }

        Ok(users)
    }

    /// Look up an interest by its normalized name, if it exists
    pub async fn find_interest(&self, name: &str) -> Result<Option<Interest>, StoreError> {
        let row: Option<InterestRow> =
            sqlx::query_as("SELECT id, name FROM interests WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Interest::from))
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

/// Get-or-create interest rows for a list of normalized names
///
/// Upsert by natural key: the no-op DO UPDATE lets RETURNING yield the row in
/// both the insert and the already-exists case. Duplicate names in the input
/// collapse to one row.
async fn resolve_interests(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    names: &[String],
) -> Result<Vec<Interest>, StoreError> {
    let mut seen = HashSet::new();
    let mut interests = Vec::new();

    for name in names {
        if !seen.insert(name.clone()) {
            continue;
        }

        let row: InterestRow = sqlx::query_as(
            "INSERT INTO interests (name) VALUES (?) \
             ON CONFLICT (name) DO UPDATE SET name = excluded.name \
             RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&mut **tx)
        .await?;

        interests.push(Interest::from(row));
    }

    Ok(interests)
}

/// Insert association rows for a user's resolved interests
async fn link_interests(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    user_id: i64,
    interests: &[Interest],
) -> Result<(), StoreError> {
    for interest in interests {
        sqlx::query("INSERT INTO user_interests (user_id, interest_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(interest.id)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}

/// Interests associated with a user, in name order
async fn interests_for_user<'e, E>(executor: E, user_id: i64) -> Result<Vec<Interest>, StoreError>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let rows: Vec<InterestRow> = sqlx::query_as(
        "SELECT i.id, i.name FROM interests i \
         JOIN user_interests ui ON ui.interest_id = i.id \
         WHERE ui.user_id = ? ORDER BY i.name",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(Interest::from).collect())
}
