pub mod config;
pub mod database;
pub mod error;
pub mod models;

pub use database::{Database, Session};
pub use error::{Error, Result};
