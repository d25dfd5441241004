pub mod common;

#[cfg(feature = "sqlite")]
pub mod sqlite;
