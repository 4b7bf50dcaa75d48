//! API Routes

pub mod health;
pub mod kv;
pub mod queue;
pub mod users;
