use crate::config::DatabaseConfig;
use crate::store::DocumentStore;
use alumni_common::AlumniServerError;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{
    ClientOptions, FindOneAndUpdateOptions, IndexOptions, ReturnDocument, ServerApi,
    ServerApiVersion,
};
use mongodb::{Client, Collection, Database, IndexModel};

const DUPLICATE_KEY: i32 = 11000;
const APP_NAME: &str = "alumni-server";

/// `DocumentStore` backed by a MongoDB deployment.
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    /**
     * Parses the connection string, builds the client and pings the database
     * so an unreachable or misconfigured deployment fails here rather than on
     * the first request
     *
     * @param config - connection string, database name and selection timeout
     * @returns - the store, or the driver error that prevented connecting
     */
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, mongodb::error::Error> {
        let mut client_options = ClientOptions::parse(&config.uri).await?;
        let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
        client_options.server_api = Some(server_api);
        client_options.server_selection_timeout = Some(config.connect_timeout);
        client_options.app_name = Some(APP_NAME.to_string());
        let client = Client::with_options(client_options)?;
        let db = client.database(&config.database);
        db.run_command(doc! { "ping": 1 }, None).await?;
        Ok(Self { db })
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection(name)
    }
}

fn duplicate_key_message(error: &mongodb::error::Error) -> Option<&str> {
    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY => {
            Some(e.message.as_str())
        }
        ErrorKind::Command(e) if e.code == DUPLICATE_KEY => Some(e.message.as_str()),
        _ => None,
    }
}

/// Pulls the field name out of a server message such as
/// `E11000 duplicate key error collection: alumni.users index: email_1 dup key: ...`
fn duplicate_field(message: &str) -> String {
    message
        .split("index: ")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .map(|index| index.trim_end_matches("_1").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn map_error(collection: &str, error: mongodb::error::Error) -> AlumniServerError {
    match duplicate_key_message(&error) {
        Some(message) => AlumniServerError::Duplicate {
            collection: collection.to_string(),
            field: duplicate_field(message),
        },
        None => AlumniServerError::MongoError(error.to_string()),
    }
}

#[rocket::async_trait]
impl DocumentStore for MongoStore {
    async fn ensure_unique(&self, collection: &str, field: &str) -> Result<(), AlumniServerError> {
        let index = IndexModel::builder()
            .keys(doc! { field: 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection(collection)
            .create_index(index, None)
            .await
            .map(|_| ())
            .map_err(|e| map_error(collection, e))
    }

    async fn insert(
        &self,
        collection: &str,
        document: Document,
    ) -> Result<ObjectId, AlumniServerError> {
        let result = self
            .collection(collection)
            .insert_one(document, None)
            .await
            .map_err(|e| map_error(collection, e))?;
        result.inserted_id.as_object_id().ok_or_else(|| {
            AlumniServerError::MongoError(format!(
                "inserted _id in {} is not an ObjectId",
                collection
            ))
        })
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, AlumniServerError> {
        self.collection(collection)
            .find_one(filter, None)
            .await
            .map_err(|e| map_error(collection, e))
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Vec<Document>, AlumniServerError> {
        let cursor = self
            .collection(collection)
            .find(filter, None)
            .await
            .map_err(|e| map_error(collection, e))?;
        cursor
            .try_collect()
            .await
            .map_err(|e| map_error(collection, e))
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<Option<Document>, AlumniServerError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        self.collection(collection)
            .find_one_and_update(filter, update, options)
            .await
            .map_err(|e| map_error(collection, e))
    }

    async fn delete_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<bool, AlumniServerError> {
        self.collection(collection)
            .delete_one(filter, None)
            .await
            .map(|result| result.deleted_count > 0)
            .map_err(|e| map_error(collection, e))
    }
}
