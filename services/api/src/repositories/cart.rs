//! Cart repository for database operations
//!
//! The cart is keyed by (user_id, book_id), so a book can hold at most one
//! line per user. Add-to-cart is a single upsert that increments the
//! existing quantity, which keeps two concurrent adds from producing
//! duplicate lines. Book deletion cascades through the cart, so a line can
//! never resolve to a missing book at read time.

use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{Book, CartLine};

/// Cart repository
#[derive(Clone)]
pub struct CartRepository {
    pool: PgPool,
}

impl CartRepository {
    /// Create a new cart repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a user's cart with book details resolved at current catalog state
    pub async fn get(&self, user_id: Uuid) -> ApiResult<Vec<CartLine>> {
        let rows = sqlx::query(
            r#"
            SELECT ci.qty,
                   b.id, b.title, b.author, b.price, b.description, b.language,
                   b.cover_url, b.created_at, b.updated_at
            FROM cart_items ci
            JOIN books b ON b.id = ci.book_id
            WHERE ci.user_id = $1
            ORDER BY ci.created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CartLine {
                qty: row.get("qty"),
                book: Book {
                    id: row.get("id"),
                    title: row.get("title"),
                    author: row.get("author"),
                    price: row.get("price"),
                    description: row.get("description"),
                    language: row.get("language"),
                    cover_url: row.get("cover_url"),
                    created_at: row.get("created_at"),
                    updated_at: row.get("updated_at"),
                },
            })
            .collect())
    }

    /// Add one copy of a book to the cart
    ///
    /// A single atomic upsert: increments the line if it exists, inserts a
    /// quantity-1 line otherwise. "Add" always means one more, never a
    /// duplicate line and never a no-op.
    pub async fn add_item(&self, user_id: Uuid, book_id: Uuid) -> ApiResult<Vec<CartLine>> {
        sqlx::query(
            r#"
            INSERT INTO cart_items (user_id, book_id, qty)
            VALUES ($1, $2, 1)
            ON CONFLICT (user_id, book_id)
            DO UPDATE SET qty = cart_items.qty + 1, updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .execute(&self.pool)
        .await?;

        self.get(user_id).await
    }

    /// Set the quantity of an existing cart line
    ///
    /// Quantities below one are rejected; reaching zero presence goes
    /// through explicit removal so intent stays unambiguous.
    pub async fn set_quantity(
        &self,
        user_id: Uuid,
        book_id: Uuid,
        qty: i32,
    ) -> ApiResult<Vec<CartLine>> {
        if qty < 1 {
            return Err(ApiError::InvalidQuantity);
        }

        let result = sqlx::query(
            r#"
            UPDATE cart_items
            SET qty = $3, updated_at = now()
            WHERE user_id = $1 AND book_id = $2
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(qty)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotInCart);
        }

        self.get(user_id).await
    }

    /// Remove a book from the cart; a no-op when the line is absent
    pub async fn remove_item(&self, user_id: Uuid, book_id: Uuid) -> ApiResult<Vec<CartLine>> {
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND book_id = $2")
            .bind(user_id)
            .bind(book_id)
            .execute(&self.pool)
            .await?;

        self.get(user_id).await
    }

    /// Empty the cart unconditionally
    pub async fn clear(&self, user_id: Uuid) -> ApiResult<()> {
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::BookRepository;
    use crate::repositories::test_support::{fixture_book, fixture_user, test_pool};
    use serial_test::serial;

    #[tokio::test]
    #[serial]
    #[ignore = "requires a running Postgres instance"]
    async fn adding_twice_yields_one_line_with_quantity_two() {
        let pool = test_pool().await;
        let repo = CartRepository::new(pool.clone());
        let user = fixture_user(&pool).await;
        let book = fixture_book(&pool, 100.0).await;

        repo.add_item(user.id, book.id).await.expect("first add");
        let cart = repo.add_item(user.id, book.id).await.expect("second add");

        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].book.id, book.id);
        assert_eq!(cart[0].qty, 2);
    }

    #[tokio::test]
    #[serial]
    #[ignore = "requires a running Postgres instance"]
    async fn quantity_zero_is_rejected_and_leaves_the_line_alone() {
        let pool = test_pool().await;
        let repo = CartRepository::new(pool.clone());
        let user = fixture_user(&pool).await;
        let book = fixture_book(&pool, 50.0).await;

        repo.add_item(user.id, book.id).await.expect("add");

        let err = repo.set_quantity(user.id, book.id, 0).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidQuantity));

        let cart = repo.get(user.id).await.expect("get");
        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].qty, 1);
    }

    #[tokio::test]
    #[serial]
    #[ignore = "requires a running Postgres instance"]
    async fn set_quantity_requires_an_existing_line() {
        let pool = test_pool().await;
        let repo = CartRepository::new(pool.clone());
        let user = fixture_user(&pool).await;
        let book = fixture_book(&pool, 50.0).await;

        let err = repo.set_quantity(user.id, book.id, 3).await.unwrap_err();
        assert!(matches!(err, ApiError::NotInCart));
    }

    #[tokio::test]
    #[serial]
    #[ignore = "requires a running Postgres instance"]
    async fn removal_is_idempotent() {
        let pool = test_pool().await;
        let repo = CartRepository::new(pool.clone());
        let user = fixture_user(&pool).await;
        let book = fixture_book(&pool, 25.0).await;

        repo.add_item(user.id, book.id).await.expect("add");
        let cart = repo.remove_item(user.id, book.id).await.expect("remove");
        assert!(cart.is_empty());

        // Removing an absent line still succeeds
        let cart = repo.remove_item(user.id, book.id).await.expect("remove again");
        assert!(cart.is_empty());
    }

    #[tokio::test]
    #[serial]
    #[ignore = "requires a running Postgres instance"]
    async fn adding_a_dead_reference_fails_with_invalid_book_id() {
        let pool = test_pool().await;
        let repo = CartRepository::new(pool.clone());
        let user = fixture_user(&pool).await;

        let err = repo.add_item(user.id, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidBookId));
    }

    #[tokio::test]
    #[serial]
    #[ignore = "requires a running Postgres instance"]
    async fn deleted_books_never_surface_in_the_cart() {
        let pool = test_pool().await;
        let repo = CartRepository::new(pool.clone());
        let books = BookRepository::new(pool.clone());
        let user = fixture_user(&pool).await;
        let book = fixture_book(&pool, 10.0).await;

        repo.add_item(user.id, book.id).await.expect("add");
        books.delete(book.id).await.expect("delete book");

        let cart = repo.get(user.id).await.expect("get");
        assert!(cart.is_empty());
    }
}
