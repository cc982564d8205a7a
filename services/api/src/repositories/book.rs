//! Book repository for database operations

use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{Book, NewBook};

/// Book repository
#[derive(Clone)]
pub struct BookRepository {
    pool: PgPool,
}

fn row_to_book(row: PgRow) -> Book {
    Book {
        id: row.get("id"),
        title: row.get("title"),
        author: row.get("author"),
        price: row.get("price"),
        description: row.get("description"),
        language: row.get("language"),
        cover_url: row.get("cover_url"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const BOOK_COLUMNS: &str =
    "id, title, author, price, description, language, cover_url, created_at, updated_at";

impl BookRepository {
    /// Create a new book repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Add a book to the catalog
    pub async fn create(&self, book: &NewBook) -> ApiResult<Book> {
        info!("Adding book to catalog: {}", book.title);

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO books (title, author, price, description, language, cover_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {BOOK_COLUMNS}
            "#,
        ))
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.price)
        .bind(&book.description)
        .bind(&book.language)
        .bind(&book.cover_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(row_to_book(row))
    }

    /// Replace a book's catalog data
    pub async fn update(&self, id: Uuid, book: &NewBook) -> ApiResult<Book> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE books
            SET title = $2, author = $3, price = $4, description = $5,
                language = $6, cover_url = $7, updated_at = now()
            WHERE id = $1
            RETURNING {BOOK_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.price)
        .bind(&book.description)
        .bind(&book.language)
        .bind(&book.cover_url)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ApiError::NotFound("Book"))?;

        Ok(row_to_book(row))
    }

    /// Delete a book from the catalog
    ///
    /// Cart lines and favourites referencing it cascade away; order lines
    /// keep their frozen copy.
    pub async fn delete(&self, id: Uuid) -> ApiResult<()> {
        info!("Deleting book: {}", id);

        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Book"));
        }
        Ok(())
    }

    /// List the whole catalog, newest first
    pub async fn list(&self) -> ApiResult<Vec<Book>> {
        let rows = sqlx::query(&format!(
            "SELECT {BOOK_COLUMNS} FROM books ORDER BY created_at DESC",
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_book).collect())
    }

    /// List the most recently added books
    pub async fn recent(&self, limit: i64) -> ApiResult<Vec<Book>> {
        let rows = sqlx::query(&format!(
            "SELECT {BOOK_COLUMNS} FROM books ORDER BY created_at DESC LIMIT $1",
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_book).collect())
    }

    /// Get a book by ID
    pub async fn get(&self, id: Uuid) -> ApiResult<Option<Book>> {
        let row = sqlx::query(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_book))
    }
}
