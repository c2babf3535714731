//! Database module exports.

mod mongo;
mod store;

pub use mongo::Database;
pub use store::{DocumentStore, MongoStore};
