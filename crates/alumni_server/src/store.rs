use alumni_common::AlumniServerError;
use mongodb::bson::{oid::ObjectId, Document};

pub mod memory;

pub use memory::MemoryStore;

/// Collection-of-documents storage underneath `AlumniDB`.
///
/// Filters support top-level equality and `$in`. Updates support `$set`,
/// `$inc`, `$push`, `$addToSet` and `$pull`. Unique indexes registered with
/// `ensure_unique` are enforced on insert and on update; a violation is
/// reported as `AlumniServerError::Duplicate`.
#[rocket::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn ensure_unique(&self, collection: &str, field: &str) -> Result<(), AlumniServerError>;

    /// Inserts a document, assigning an ObjectId `_id` when it has none.
    async fn insert(
        &self,
        collection: &str,
        document: Document,
    ) -> Result<ObjectId, AlumniServerError>;

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, AlumniServerError>;

    async fn find(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Vec<Document>, AlumniServerError>;

    /// Applies `update` to the first match and returns the document as it
    /// is after the update, or None when nothing matched.
    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<Option<Document>, AlumniServerError>;

    async fn delete_one(&self, collection: &str, filter: Document)
        -> Result<bool, AlumniServerError>;
}
