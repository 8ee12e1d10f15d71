//! Database layer (PostgreSQL).

pub mod postgres;

pub use postgres::{Database, UnitOfWork};
