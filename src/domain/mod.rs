//! Domain layer rules shared by services and adapters.

pub mod posts;
pub mod slug;
