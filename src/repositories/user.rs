//! # User Repository
//!
//! CRUD, filtered listing and username search over the `users` collection.
//! Lookups accept either the internal id or the external `userId` key.

use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database,
    bson::{self, Document, doc, oid::ObjectId},
    options::ReturnDocument,
};

use crate::error::ApiError;
use crate::filter::PredicateBuilder;
use crate::models::{UpdateUser, User};

const COLLECTION: &str = "users";

/// Repository for user store operations.
pub struct UserRepository<'a> {
    db: &'a Database,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database handle.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<User> {
        self.db.collection(COLLECTION)
    }

    /// Matches a user by internal id or by the external `userId` field.
    fn key_filter(key: &str) -> Document {
        doc! { "$or": [ { "_id": key }, { "userId": key } ] }
    }

    /// Insert a new user. A duplicate `userId` is rejected up front; the
    /// unique sparse index remains the authoritative guard.
    pub async fn create(&self, mut user: User) -> Result<User, ApiError> {
        if let Some(user_id) = &user.user_id {
            let existing = self
                .collection()
                .find_one(doc! { "userId": user_id })
                .await?;
            if existing.is_some() {
                return Err(ApiError::Conflict(format!(
                    "user with userId '{user_id}' already exists"
                )));
            }
        }

        user.id.get_or_insert_with(|| ObjectId::new().to_hex());
        self.collection().insert_one(&user).await?;
        Ok(user)
    }

    /// List the users matching the given predicate, in store order.
    pub async fn find_filtered(&self, predicate: Document) -> Result<Vec<User>, ApiError> {
        let cursor = self.collection().find(predicate).await?;
        Ok(cursor.try_collect().await?)
    }

    /// Fetch a user by internal id or external `userId`.
    pub async fn find_by_key(&self, key: &str) -> Result<Option<User>, ApiError> {
        Ok(self.collection().find_one(Self::key_filter(key)).await?)
    }

    /// Case-insensitive substring search on `username`.
    pub async fn search_by_username(&self, username: &str) -> Result<Vec<User>, ApiError> {
        let predicate = PredicateBuilder::new()
            .substring("username", Some(username))
            .build();
        self.find_filtered(predicate).await
    }

    /// Apply a partial update, returning the updated user. Fields absent from
    /// the payload keep their prior values.
    pub async fn update(&self, key: &str, update: &UpdateUser) -> Result<Option<User>, ApiError> {
        let set = bson::to_document(update).map_err(|e| ApiError::Store(e.to_string()))?;
        if set.is_empty() {
            return self.find_by_key(key).await;
        }

        Ok(self
            .collection()
            .find_one_and_update(Self::key_filter(key), doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?)
    }

    /// Delete a user; returns whether a document was removed.
    pub async fn delete(&self, key: &str) -> Result<bool, ApiError> {
        let result = self
            .collection()
            .delete_one(Self::key_filter(key))
            .await?;
        Ok(result.deleted_count > 0)
    }
}
