//! Application services layer.

pub mod api_keys;
pub mod authors;
pub mod books;
pub mod error;
pub mod pagination;
pub mod projections;
pub mod repos;
