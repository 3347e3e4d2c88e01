//! # Flat Repository
//!
//! CRUD and filtered listing over the `flats` collection.

use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database,
    bson::{self, Document, doc, oid::ObjectId},
    options::ReturnDocument,
};

use crate::error::ApiError;
use crate::models::{Flat, UpdateFlat};

const COLLECTION: &str = "flats";

/// Repository for flat listing store operations.
pub struct FlatRepository<'a> {
    db: &'a Database,
}

impl<'a> FlatRepository<'a> {
    /// Create a new FlatRepository with the given database handle.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<Flat> {
        self.db.collection(COLLECTION)
    }

    /// Insert a new flat, assigning its identifier.
    pub async fn create(&self, mut flat: Flat) -> Result<Flat, ApiError> {
        flat.id.get_or_insert_with(|| ObjectId::new().to_hex());
        self.collection().insert_one(&flat).await?;
        Ok(flat)
    }

    /// List every flat in store order.
    pub async fn list(&self) -> Result<Vec<Flat>, ApiError> {
        let cursor = self.collection().find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    /// List the flats matching the given predicate, in store order.
    pub async fn find_filtered(&self, predicate: Document) -> Result<Vec<Flat>, ApiError> {
        let cursor = self.collection().find(predicate).await?;
        Ok(cursor.try_collect().await?)
    }

    /// Fetch a flat by its identifier.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Flat>, ApiError> {
        Ok(self.collection().find_one(doc! { "_id": id }).await?)
    }

    /// Apply a partial update, returning the updated flat. Fields absent from
    /// the payload keep their prior values.
    pub async fn update(&self, id: &str, update: &UpdateFlat) -> Result<Option<Flat>, ApiError> {
        let set = bson::to_document(update).map_err(|e| ApiError::Store(e.to_string()))?;
        if set.is_empty() {
            // An empty $set is rejected by the server; nothing would change anyway.
            return self.find_by_id(id).await;
        }

        Ok(self
            .collection()
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?)
    }

    /// Delete a flat by its identifier; returns whether a document was removed.
    pub async fn delete(&self, id: &str) -> Result<bool, ApiError> {
        let result = self.collection().delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}
