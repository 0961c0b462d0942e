use crate::store::DocumentStore;
use alumni_common::AlumniServerError;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Collection {
    documents: Vec<Document>,
    unique: Vec<String>,
}

impl Collection {
    /// Finds the unique field `document` would collide on, ignoring the
    /// document at `skip` (the one being replaced).
    fn conflicting_field(&self, document: &Document, skip: Option<usize>) -> Option<String> {
        std::iter::once("_id")
            .chain(self.unique.iter().map(String::as_str))
            .find(|field| match document.get(*field) {
                Some(value) => self
                    .documents
                    .iter()
                    .enumerate()
                    .any(|(i, other)| Some(i) != skip && other.get(*field) == Some(value)),
                None => false,
            })
            .map(str::to_string)
    }
}

/// In-process `DocumentStore` with the same observable semantics as the
/// MongoDB-backed store for the operations `AlumniDB` issues.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Collection>>, AlumniServerError> {
        self.collections
            .lock()
            .map_err(|_| AlumniServerError::MongoError("memory store lock poisoned".to_string()))
    }
}

fn duplicate(collection: &str, field: String) -> AlumniServerError {
    AlumniServerError::Duplicate {
        collection: collection.to_string(),
        field,
    }
}

fn unsupported(what: String) -> AlumniServerError {
    AlumniServerError::MongoError(what)
}

fn matches(filter: &Document, document: &Document) -> bool {
    filter.iter().all(|(key, expected)| {
        let actual = document.get(key);
        match expected {
            Bson::Document(operators) if operators.keys().any(|k| k.starts_with('$')) => {
                operators
                    .iter()
                    .all(|(operator, operand)| match (operator.as_str(), operand) {
                        ("$in", Bson::Array(options)) => {
                            actual.map_or(false, |value| options.contains(value))
                        }
                        _ => false,
                    })
            }
            _ => match actual {
                Some(Bson::Array(items)) if !matches!(expected, Bson::Array(_)) => {
                    items.contains(expected)
                }
                Some(value) => value == expected,
                None => matches!(expected, Bson::Null),
            },
        }
    })
}

fn array_mut<'a>(
    document: &'a mut Document,
    key: &str,
) -> Result<&'a mut Vec<Bson>, AlumniServerError> {
    if !document.contains_key(key) {
        document.insert(key, Bson::Array(vec![]));
    }
    match document.get_mut(key) {
        Some(Bson::Array(items)) => Ok(items),
        _ => Err(unsupported(format!("field `{}` is not an array", key))),
    }
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(*v as f64),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

// int32 sums widen to int64 on overflow; int64 overflow is an error, as in mongod
fn increment(current: &Bson, delta: &Bson, key: &str) -> Result<Bson, AlumniServerError> {
    let overflow = || unsupported(format!("$inc overflows field `{}`", key));
    Ok(match (current, delta) {
        (Bson::Int32(a), Bson::Int32(b)) => a
            .checked_add(*b)
            .map(Bson::Int32)
            .unwrap_or(Bson::Int64(*a as i64 + *b as i64)),
        (Bson::Int32(a), Bson::Int64(b)) => {
            Bson::Int64((*a as i64).checked_add(*b).ok_or_else(overflow)?)
        }
        (Bson::Int64(a), Bson::Int32(b)) => {
            Bson::Int64(a.checked_add(*b as i64).ok_or_else(overflow)?)
        }
        (Bson::Int64(a), Bson::Int64(b)) => Bson::Int64(a.checked_add(*b).ok_or_else(overflow)?),
        (a, b) => match (as_f64(a), as_f64(b)) {
            (Some(a), Some(b)) => Bson::Double(a + b),
            _ => return Err(unsupported(format!("cannot $inc non-numeric field `{}`", key))),
        },
    })
}

// sub-document conditions match array elements whose fields are a superset
fn pull_matches(condition: &Bson, item: &Bson) -> bool {
    match (condition, item) {
        (Bson::Document(condition), Bson::Document(element)) => condition
            .iter()
            .all(|(key, value)| element.get(key) == Some(value)),
        _ => condition == item,
    }
}

fn apply_update(document: &mut Document, update: &Document) -> Result<(), AlumniServerError> {
    for (operator, fields) in update {
        let fields = match fields {
            Bson::Document(fields) => fields,
            _ => return Err(unsupported(format!("{} expects a document", operator))),
        };
        for (key, value) in fields {
            if key == "_id" {
                return Err(unsupported("_id is immutable".to_string()));
            }
            match operator.as_str() {
                "$set" => {
                    document.insert(key, value.clone());
                }
                "$inc" => {
                    let current = document.get(key).cloned().unwrap_or(Bson::Int32(0));
                    let next = increment(&current, value, key)?;
                    document.insert(key, next);
                }
                "$push" => array_mut(document, key)?.push(value.clone()),
                "$addToSet" => {
                    let items = array_mut(document, key)?;
                    if !items.contains(value) {
                        items.push(value.clone());
                    }
                }
                "$pull" => array_mut(document, key)?.retain(|item| !pull_matches(value, item)),
                other => return Err(unsupported(format!("unsupported update operator {}", other))),
            }
        }
    }
    Ok(())
}

#[rocket::async_trait]
impl DocumentStore for MemoryStore {
    async fn ensure_unique(&self, collection: &str, field: &str) -> Result<(), AlumniServerError> {
        let mut collections = self.lock()?;
        let entry = collections.entry(collection.to_string()).or_default();
        if entry.unique.iter().any(|f| f == field) {
            return Ok(());
        }
        // building the index fails if existing documents already collide
        for (i, document) in entry.documents.iter().enumerate() {
            if let Some(value) = document.get(field) {
                if entry.documents[i + 1..]
                    .iter()
                    .any(|other| other.get(field) == Some(value))
                {
                    return Err(duplicate(collection, field.to_string()));
                }
            }
        }
        entry.unique.push(field.to_string());
        Ok(())
    }

    async fn insert(
        &self,
        collection: &str,
        mut document: Document,
    ) -> Result<ObjectId, AlumniServerError> {
        let id = match document.get("_id") {
            Some(Bson::ObjectId(id)) => *id,
            Some(_) => return Err(unsupported("_id must be an ObjectId".to_string())),
            None => {
                let id = ObjectId::new();
                document.insert("_id", id);
                id
            }
        };
        let mut collections = self.lock()?;
        let entry = collections.entry(collection.to_string()).or_default();
        if let Some(field) = entry.conflicting_field(&document, None) {
            return Err(duplicate(collection, field));
        }
        entry.documents.push(document);
        Ok(id)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, AlumniServerError> {
        let collections = self.lock()?;
        Ok(collections.get(collection).and_then(|entry| {
            entry
                .documents
                .iter()
                .find(|document| matches(&filter, document))
                .cloned()
        }))
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Vec<Document>, AlumniServerError> {
        let collections = self.lock()?;
        Ok(collections
            .get(collection)
            .map(|entry| {
                entry
                    .documents
                    .iter()
                    .filter(|document| matches(&filter, document))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<Option<Document>, AlumniServerError> {
        let mut collections = self.lock()?;
        let Some(entry) = collections.get_mut(collection) else {
            return Ok(None);
        };
        let Some(index) = entry
            .documents
            .iter()
            .position(|document| matches(&filter, document))
        else {
            return Ok(None);
        };
        let mut updated = entry.documents[index].clone();
        apply_update(&mut updated, &update)?;
        if let Some(field) = entry.conflicting_field(&updated, Some(index)) {
            return Err(duplicate(collection, field));
        }
        entry.documents[index] = updated.clone();
        Ok(Some(updated))
    }

    async fn delete_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<bool, AlumniServerError> {
        let mut collections = self.lock()?;
        let Some(entry) = collections.get_mut(collection) else {
            return Ok(false);
        };
        match entry
            .documents
            .iter()
            .position(|document| matches(&filter, document))
        {
            Some(index) => {
                entry.documents.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use mongodb::bson::doc;

    #[tokio::test]
    async fn test_insert_assigns_object_id() {
        let store = MemoryStore::new();
        let id = store.insert("users", doc! { "email": "a@x.com" }).await.unwrap();
        let found = store
            .find_one("users", doc! { "_id": id })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.get_str("email").unwrap(), "a@x.com");
    }

    #[tokio::test]
    async fn test_unique_field_rejects_second_insert() {
        let store = MemoryStore::new();
        store.ensure_unique("users", "email").await.unwrap();
        store.insert("users", doc! { "email": "a@x.com", "n": 1 }).await.unwrap();
        let err = store
            .insert("users", doc! { "email": "a@x.com", "n": 2 })
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AlumniServerError::Duplicate {
                collection: "users".to_string(),
                field: "email".to_string()
            }
        );
        let all = store.find("users", doc! {}).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].get_i32("n").unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_into_duplicate_rejected_and_rolled_back() {
        let store = MemoryStore::new();
        store.ensure_unique("users", "email").await.unwrap();
        store.insert("users", doc! { "email": "a@x.com" }).await.unwrap();
        let b = store.insert("users", doc! { "email": "b@x.com" }).await.unwrap();
        let err = store
            .find_one_and_update(
                "users",
                doc! { "_id": b },
                doc! { "$set": { "email": "a@x.com" } },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AlumniServerError::Duplicate { .. }));
        let b_doc = store.find_one("users", doc! { "_id": b }).await.unwrap().unwrap();
        assert_eq!(b_doc.get_str("email").unwrap(), "b@x.com");
    }

    #[tokio::test]
    async fn test_ensure_unique_fails_on_existing_duplicates() {
        let store = MemoryStore::new();
        store.insert("jobs", doc! { "id": "j1" }).await.unwrap();
        store.insert("jobs", doc! { "id": "j1" }).await.unwrap();
        assert!(store.ensure_unique("jobs", "id").await.is_err());
    }

    #[tokio::test]
    async fn test_update_operators() {
        let store = MemoryStore::new();
        let id = store
            .insert(
                "posts",
                doc! { "count": 1_i64, "raised": 10.5, "tags": ["a"], "likes": [{ "userId": 1 }, { "userId": 2 }] },
            )
            .await
            .unwrap();
        let updated = store
            .find_one_and_update(
                "posts",
                doc! { "_id": id },
                doc! {
                    "$inc": { "count": 1, "raised": 4.5 },
                    "$addToSet": { "tags": "a" },
                    "$push": { "comments": { "text": "hi" } },
                    "$pull": { "likes": { "userId": 1 } },
                    "$set": { "title": "x" },
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.get_i64("count").unwrap(), 2);
        assert_eq!(updated.get_f64("raised").unwrap(), 15.0);
        assert_eq!(updated.get_array("tags").unwrap().len(), 1);
        assert_eq!(updated.get_array("comments").unwrap().len(), 1);
        assert_eq!(
            updated.get_array("likes").unwrap(),
            &vec![Bson::Document(doc! { "userId": 2 })]
        );
        assert_eq!(updated.get_str("title").unwrap(), "x");
    }

    #[tokio::test]
    async fn test_inc_widens_int32_on_overflow() {
        let store = MemoryStore::new();
        let id = store
            .insert("events", doc! { "registeredCount": i32::MAX })
            .await
            .unwrap();
        let updated = store
            .find_one_and_update(
                "events",
                doc! { "_id": id },
                doc! { "$inc": { "registeredCount": 1 } },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            updated.get("registeredCount"),
            Some(&Bson::Int64(i32::MAX as i64 + 1))
        );
    }

    #[tokio::test]
    async fn test_inc_int64_overflow_leaves_document_untouched() {
        let store = MemoryStore::new();
        let id = store
            .insert("donationcampaigns", doc! { "donors": i64::MAX })
            .await
            .unwrap();
        let err = store
            .find_one_and_update(
                "donationcampaigns",
                doc! { "_id": id },
                doc! { "$inc": { "donors": 1_i64 } },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AlumniServerError::MongoError(_)));
        let stored = store
            .find_one("donationcampaigns", doc! { "_id": id })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.get_i64("donors").unwrap(), i64::MAX);
    }

    #[tokio::test]
    async fn test_filters() {
        let store = MemoryStore::new();
        let a = store.insert("users", doc! { "skills": ["rust", "go"] }).await.unwrap();
        let b = store.insert("users", doc! { "skills": ["java"] }).await.unwrap();
        store.insert("users", doc! { "skills": [] }).await.unwrap();

        let rust = store.find("users", doc! { "skills": "rust" }).await.unwrap();
        assert_eq!(rust.len(), 1);

        let some = store
            .find("users", doc! { "_id": { "$in": [a, b] } })
            .await
            .unwrap();
        assert_eq!(some.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_collection_is_empty() {
        let store = MemoryStore::new();
        assert!(store.find("nothing", doc! {}).await.unwrap().is_empty());
        assert!(store
            .find_one_and_update("nothing", doc! {}, doc! { "$set": { "a": 1 } })
            .await
            .unwrap()
            .is_none());
        assert!(!store.delete_one("nothing", doc! {}).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_one() {
        let store = MemoryStore::new();
        let id = store.insert("events", doc! { "id": "e1" }).await.unwrap();
        assert!(store.delete_one("events", doc! { "id": "e1" }).await.unwrap());
        assert!(store.find_one("events", doc! { "_id": id }).await.unwrap().is_none());
    }
}
