//! BookMart domain models

pub mod book;
pub mod cart;
pub mod order;
pub mod user;

// Re-export for convenience
pub use book::{Book, NewBook};
pub use cart::CartLine;
pub use order::{Order, OrderLineView, OrderStatus, OrderView, OrderedBy, PlacedLine};
pub use user::{NewUser, Role, User};
