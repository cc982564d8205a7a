//! Repositories for database operations

pub mod book;
pub mod cart;
pub mod favourite;
pub mod order;
pub mod user;

pub use book::BookRepository;
pub use cart::CartRepository;
pub use favourite::FavouriteRepository;
pub use order::OrderRepository;
pub use user::UserRepository;
