//! Favourite repository for database operations

use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::Book;

/// Favourite repository
#[derive(Clone)]
pub struct FavouriteRepository {
    pool: PgPool,
}

impl FavouriteRepository {
    /// Create a new favourite repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Add a book to a user's favourites; a no-op when already present
    pub async fn add(&self, user_id: Uuid, book_id: Uuid) -> ApiResult<()> {
        sqlx::query(
            r#"
            INSERT INTO favourites (user_id, book_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, book_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Remove a book from a user's favourites
    pub async fn remove(&self, user_id: Uuid, book_id: Uuid) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM favourites WHERE user_id = $1 AND book_id = $2")
            .bind(user_id)
            .bind(book_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::Validation("Book is not in favourites".to_string()));
        }
        Ok(())
    }

    /// List a user's favourite books with details resolved
    pub async fn list(&self, user_id: Uuid) -> ApiResult<Vec<Book>> {
        let rows = sqlx::query(
            r#"
            SELECT b.id, b.title, b.author, b.price, b.description, b.language,
                   b.cover_url, b.created_at, b.updated_at
            FROM favourites f
            JOIN books b ON b.id = f.book_id
            WHERE f.user_id = $1
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Book {
                id: row.get("id"),
                title: row.get("title"),
                author: row.get("author"),
                price: row.get("price"),
                description: row.get("description"),
                language: row.get("language"),
                cover_url: row.get("cover_url"),
                created_at: row.get("created_at"),
                updated_at: row.get("updated_at"),
            })
            .collect())
    }
}
