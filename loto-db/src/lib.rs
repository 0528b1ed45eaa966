pub mod db;
pub mod error;
pub mod models;
pub mod parse;

pub use rusqlite;
