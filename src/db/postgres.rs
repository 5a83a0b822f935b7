use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool, QueryBuilder};

use crate::db::{FavoriteStore, MediaStore, RatingStore, UserStore};
use crate::error::{AppError, AppResult};
use crate::models::{MediaDraft, MediaEntry, MediaFilter, NewRating, Rating, RatingState, User};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Bootstraps the schema
///
/// Idempotent; safe to run on every startup.
pub async fn init_schema(pool: &PgPool) -> anyhow::Result<()> {
    let statements = [
        r"
        CREATE TABLE IF NOT EXISTS users (
            id BIGSERIAL PRIMARY KEY,
            username VARCHAR(50) UNIQUE NOT NULL,
            password_hash VARCHAR(200) NOT NULL,
            token VARCHAR(100)
        )",
        r"
        CREATE TABLE IF NOT EXISTS media (
            id BIGSERIAL PRIMARY KEY,
            title VARCHAR(100) NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            media_type VARCHAR(50) NOT NULL DEFAULT '',
            release_year INT NOT NULL,
            genres TEXT[] NOT NULL DEFAULT '{}',
            age_restriction INT NOT NULL DEFAULT 0,
            creator_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE
        )",
        r"
        CREATE TABLE IF NOT EXISTS ratings (
            id BIGSERIAL PRIMARY KEY,
            media_id BIGINT NOT NULL REFERENCES media(id) ON DELETE CASCADE,
            user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            stars INT NOT NULL CHECK (stars BETWEEN 1 AND 5),
            comment TEXT,
            is_confirmed BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            UNIQUE (media_id, user_id)
        )",
        r"
        CREATE TABLE IF NOT EXISTS rating_likes (
            rating_id BIGINT NOT NULL REFERENCES ratings(id) ON DELETE CASCADE,
            user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            PRIMARY KEY (rating_id, user_id)
        )",
        r"
        CREATE TABLE IF NOT EXISTS favorites (
            user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            media_id BIGINT NOT NULL REFERENCES media(id) ON DELETE CASCADE,
            PRIMARY KEY (user_id, media_id)
        )",
    ];

    for ddl in statements {
        sqlx::query(ddl).execute(pool).await?;
    }

    tracing::info!("database schema initialized");
    Ok(())
}

/// PostgreSQL-backed implementation of every store trait
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    token: Option<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            token: row.token,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MediaRow {
    id: i64,
    title: String,
    description: String,
    media_type: String,
    release_year: i32,
    genres: Vec<String>,
    age_restriction: i32,
    creator_id: i64,
}

impl From<MediaRow> for MediaEntry {
    fn from(row: MediaRow) -> Self {
        MediaEntry {
            id: row.id,
            title: row.title,
            description: row.description,
            media_type: row.media_type,
            release_year: row.release_year,
            genres: row.genres,
            age_restriction: row.age_restriction,
            creator_id: row.creator_id,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RatingRow {
    id: i64,
    media_id: i64,
    user_id: i64,
    stars: i32,
    comment: Option<String>,
    is_confirmed: bool,
    created_at: DateTime<Utc>,
}

impl From<RatingRow> for Rating {
    fn from(row: RatingRow) -> Self {
        Rating {
            id: row.id,
            media_id: row.media_id,
            user_id: row.user_id,
            stars: row.stars,
            comment: row.comment,
            state: RatingState::from_confirmed(row.is_confirmed),
            created_at: row.created_at,
        }
    }
}

const RATING_COLUMNS: &str = "id, media_id, user_id, stars, comment, is_confirmed, created_at";
const MEDIA_COLUMNS: &str =
    "id, title, description, media_type, release_year, genres, age_restriction, creator_id";

#[async_trait::async_trait]
impl UserStore for PgStore {
    async fn insert(&self, username: &str, password_hash: &str) -> AppResult<User> {
        // ON CONFLICT DO NOTHING RETURNING yields no row when the username is
        // taken, so callers never inspect driver error codes.
        let row: Option<UserRow> = sqlx::query_as(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2)
             ON CONFLICT (username) DO NOTHING
             RETURNING id, username, password_hash, token",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::from)
            .ok_or_else(|| AppError::Conflict("User already exists".to_string()))
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, username, password_hash, token FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, username, password_hash, token FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, username, password_hash, token FROM users WHERE token = $1")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(User::from))
    }

    async fn set_token(&self, user_id: i64, token: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET token = $1 WHERE id = $2")
            .bind(token)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let rows: Vec<UserRow> =
            sqlx::query_as("SELECT id, username, password_hash, token FROM users ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }
}

#[async_trait::async_trait]
impl MediaStore for PgStore {
    async fn insert(&self, draft: MediaDraft, creator_id: i64) -> AppResult<MediaEntry> {
        let row: MediaRow = sqlx::query_as(&format!(
            "INSERT INTO media (title, description, media_type, release_year, genres, age_restriction, creator_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {MEDIA_COLUMNS}"
        ))
        .bind(draft.title)
        .bind(draft.description)
        .bind(draft.media_type)
        .bind(draft.release_year)
        .bind(draft.genres)
        .bind(draft.age_restriction)
        .bind(creator_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn update(&self, id: i64, draft: MediaDraft) -> AppResult<()> {
        sqlx::query(
            "UPDATE media SET title = $1, description = $2, media_type = $3,
             release_year = $4, genres = $5, age_restriction = $6 WHERE id = $7",
        )
        .bind(draft.title)
        .bind(draft.description)
        .bind(draft.media_type)
        .bind(draft.release_year)
        .bind(draft.genres)
        .bind(draft.age_restriction)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM media WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<MediaEntry>> {
        let row: Option<MediaRow> =
            sqlx::query_as(&format!("SELECT {MEDIA_COLUMNS} FROM media WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(MediaEntry::from))
    }

    async fn list(&self, filter: &MediaFilter) -> AppResult<Vec<MediaEntry>> {
        let mut query = QueryBuilder::new(format!("SELECT {MEDIA_COLUMNS} FROM media WHERE 1=1"));

        if let Some(title) = &filter.title {
            query.push(" AND title ILIKE ");
            query.push_bind(format!("%{title}%"));
        }
        if let Some(genre) = &filter.genre {
            query.push(" AND ");
            query.push_bind(genre.clone());
            query.push(" = ANY(genres)");
        }
        if let Some(media_type) = &filter.media_type {
            query.push(" AND media_type = ");
            query.push_bind(media_type.clone());
        }
        if let Some(year) = filter.release_year {
            query.push(" AND release_year = ");
            query.push_bind(year);
        }
        if let Some(age) = filter.age_restriction {
            query.push(" AND age_restriction <= ");
            query.push_bind(age);
        }
        query.push(" ORDER BY id");

        let rows: Vec<MediaRow> = query.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(MediaEntry::from).collect())
    }
}

#[async_trait::async_trait]
impl RatingStore for PgStore {
    async fn insert(&self, rating: NewRating) -> AppResult<Rating> {
        // The uniqueness constraint on (media_id, user_id) arbitrates
        // concurrent submissions; no row back means the pair already exists.
        let row: Option<RatingRow> = sqlx::query_as(&format!(
            "INSERT INTO ratings (media_id, user_id, stars, comment, is_confirmed)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (media_id, user_id) DO NOTHING
             RETURNING {RATING_COLUMNS}"
        ))
        .bind(rating.media_id)
        .bind(rating.user_id)
        .bind(rating.stars)
        .bind(rating.comment)
        .bind(rating.state.is_confirmed())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Rating::from).ok_or(AppError::DuplicateRating)
    }

    async fn update_content(
        &self,
        id: i64,
        stars: i32,
        comment: Option<String>,
        state: RatingState,
    ) -> AppResult<()> {
        sqlx::query("UPDATE ratings SET stars = $1, comment = $2, is_confirmed = $3 WHERE id = $4")
            .bind(stars)
            .bind(comment)
            .bind(state.is_confirmed())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_state(&self, id: i64, state: RatingState) -> AppResult<()> {
        sqlx::query("UPDATE ratings SET is_confirmed = $1 WHERE id = $2")
            .bind(state.is_confirmed())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        // Likes cascade via the foreign key
        sqlx::query("DELETE FROM ratings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Rating>> {
        let row: Option<RatingRow> =
            sqlx::query_as(&format!("SELECT {RATING_COLUMNS} FROM ratings WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Rating::from))
    }

    async fn list_by_media(&self, media_id: i64, confirmed_only: bool) -> AppResult<Vec<Rating>> {
        let sql = if confirmed_only {
            format!(
                "SELECT {RATING_COLUMNS} FROM ratings
                 WHERE media_id = $1 AND is_confirmed = TRUE
                 ORDER BY created_at DESC, id DESC"
            )
        } else {
            format!(
                "SELECT {RATING_COLUMNS} FROM ratings
                 WHERE media_id = $1
                 ORDER BY created_at DESC, id DESC"
            )
        };
        let rows: Vec<RatingRow> = sqlx::query_as(&sql)
            .bind(media_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Rating::from).collect())
    }

    async fn list_by_user(&self, user_id: i64) -> AppResult<Vec<Rating>> {
        let rows: Vec<RatingRow> = sqlx::query_as(&format!(
            "SELECT {RATING_COLUMNS} FROM ratings WHERE user_id = $1 ORDER BY created_at, id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Rating::from).collect())
    }

    async fn count_by_user(&self, user_id: i64) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ratings WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn insert_like(&self, rating_id: i64, user_id: i64) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO rating_likes (rating_id, user_id) VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(rating_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_like(&self, rating_id: i64, user_id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM rating_likes WHERE rating_id = $1 AND user_id = $2")
            .bind(rating_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count_likes(&self, rating_id: i64) -> AppResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM rating_likes WHERE rating_id = $1")
                .bind(rating_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u64)
    }
}

#[async_trait::async_trait]
impl FavoriteStore for PgStore {
    async fn insert(&self, user_id: i64, media_id: i64) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO favorites (user_id, media_id) VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(media_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, user_id: i64, media_id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND media_id = $2")
            .bind(user_id)
            .bind(media_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_media_ids(&self, user_id: i64) -> AppResult<Vec<i64>> {
        let ids: Vec<i64> =
            sqlx::query_scalar("SELECT media_id FROM favorites WHERE user_id = $1 ORDER BY media_id")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(ids)
    }
}
