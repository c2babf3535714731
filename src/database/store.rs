//! Per-guild config documents.
//!
//! One document per guild in `guild_config`: `{ id: <guild>, <namespace>: {...} }`.

use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use mongodb::Collection;
use tracing::debug;

use super::Database;
use crate::error::Result;

/// Access to the document backing an owner's configuration.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Full document for `owner_id`, empty when none exists.
    async fn get_document(&self, owner_id: u64) -> Result<Document>;

    /// Atomically `$set` the dotted paths in `partial`, creating the document
    /// if needed. Returns the document as it is after the update.
    async fn merge_update(&self, owner_id: u64, partial: Document) -> Result<Document>;
}

/// MongoDB-backed document store.
#[derive(Debug, Clone)]
pub struct MongoStore {
    collection: Collection<Document>,
}

impl MongoStore {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("guild_config"),
        }
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn get_document(&self, owner_id: u64) -> Result<Document> {
        let filter = doc! { "id": owner_id as i64 };
        let result = self.collection.find_one(filter).await?;
        debug!("DB get guild config for {}: {:?}", owner_id, result.is_some());
        Ok(result.unwrap_or_default())
    }

    async fn merge_update(&self, owner_id: u64, partial: Document) -> Result<Document> {
        let filter = doc! { "id": owner_id as i64 };
        let update = doc! { "$set": partial };
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        let result = self
            .collection
            .find_one_and_update(filter, update)
            .with_options(options)
            .await?;

        debug!("Merged guild config update for {}", owner_id);
        Ok(result.unwrap_or_default())
    }
}
