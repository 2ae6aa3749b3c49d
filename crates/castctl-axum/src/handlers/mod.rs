//! HTTP request handlers.

pub mod auth;
pub mod streams;
pub mod videos;
