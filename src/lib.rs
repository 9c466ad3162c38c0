pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod normalize;
pub mod sentiment;
pub mod upstream;
