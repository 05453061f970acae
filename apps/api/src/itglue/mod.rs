// IT Glue integration: organization picker, profile building and form pre-fill.
// Read-only; every outbound call goes through the AssetSource trait.

pub mod client;
pub mod handlers;
pub mod mapping;
pub mod models;
pub mod profile;

pub use client::{AssetSource, ItGlueClient};
