//! Serializable view models returned by the HTTP surface.

pub mod views;
