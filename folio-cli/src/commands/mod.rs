//! Subcommand implementations.

pub mod config;
pub mod favicon;
pub mod routes;
pub mod serve;
pub mod sitemap;
pub mod upload;
pub mod video;
