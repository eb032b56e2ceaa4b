pub mod book_store;
pub mod error;
pub mod filter;
pub mod model;
pub mod routes;
