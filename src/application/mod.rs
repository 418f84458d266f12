//! Application services and the pure listing core they build on.

pub mod directory;
pub mod error;
pub mod listing;
pub mod metadata;
pub mod pagination;
pub mod post;
pub mod related;
pub mod repos;
pub mod sitemap;
