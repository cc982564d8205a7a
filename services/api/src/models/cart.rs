//! Cart model and related functionality

use serde::{Deserialize, Serialize};

use crate::models::book::Book;

/// A single cart line: one book, with a quantity of at least one.
///
/// The book is resolved against the catalog at read time, so the price
/// shown here always reflects the current catalog price. Order totals are
/// frozen separately at placement time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub book: Book,
    pub qty: i32,
}
