pub mod app;
pub mod config;
pub mod record;
pub mod replay;
pub mod shared;
