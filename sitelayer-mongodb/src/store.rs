use async_trait::async_trait;
use futures::TryStreamExt;
use bson::{Document, Bson, doc};
use mongodb::{
    Client, Collection as MongoCollection, IndexModel,
    options::{ClientOptions, FindOptions},
};
use tracing::debug;
use sitelayer_core::{
    backend::{IndexKind, StoreBackend, StoreBackendBuilder},
    document::STORE_ID_FIELD,
    error::{DocumentStoreError, DocumentStoreResult},
    query::{Expr, Query, SortDirection},
};

use crate::query::compile_filter;


#[derive(Debug)]
pub struct MongoDbStore {
    client: Client,
    database: String,
}

impl MongoDbStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::new(dsn, database)
    }

    fn get_collection(&self, collection_name: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(collection_name)
    }

    async fn shutdown(self) -> DocumentStoreResult<()> {
        self.client.shutdown().await;

        Ok(())
    }
}

fn backend_error(err: mongodb::error::Error) -> DocumentStoreError {
    DocumentStoreError::Backend(err.to_string())
}

#[async_trait]
impl StoreBackend for MongoDbStore {
    async fn insert_document(&self, document: Document, collection: &str) -> DocumentStoreResult<Bson> {
        Ok(
            self.get_collection(collection)
                .insert_one(document)
                .await
                .map_err(backend_error)?
                .inserted_id
        )
    }

    async fn find_document(&self, id: &Bson, collection: &str) -> DocumentStoreResult<Option<Document>> {
        self.get_collection(collection)
            .find_one(doc! { STORE_ID_FIELD: id.clone() })
            .await
            .map_err(backend_error)
    }

    async fn query_documents(&self, query: Query, collection: &str) -> DocumentStoreResult<Vec<Document>> {
        let mut options = FindOptions::default();

        if let Some(limit) = query.limit {
            options.limit = Some(limit as i64);
        }
        if let Some(skip) = query.offset {
            options.skip = Some(skip as u64);
        }
        if !query.sort.is_empty() {
            options.sort = Some(Document::from_iter(
                query.sort.iter().map(|sort| {
                    (
                        sort.field.clone(),
                        Bson::Int32(match sort.direction {
                            SortDirection::Asc => 1,
                            SortDirection::Desc => -1,
                        }),
                    )
                }),
            ));
        }

        let filter = compile_filter(query.filter.as_ref())?;
        debug!(collection, %filter, "find");

        self.get_collection(collection)
            .find(filter)
            .with_options(options)
            .await
            .map_err(backend_error)?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(backend_error)
    }

    async fn count_documents(&self, filter: Option<Expr>, collection: &str) -> DocumentStoreResult<u64> {
        let filter = compile_filter(filter.as_ref())?;
        debug!(collection, %filter, "count");

        self.get_collection(collection)
            .count_documents(filter)
            .await
            .map_err(backend_error)
    }

    async fn add_index(&self, collection: &str, field: &str, kind: IndexKind) -> DocumentStoreResult<()> {
        let keys = match kind {
            IndexKind::Sphere2d => doc! { field: "2dsphere" },
        };

        self.get_collection(collection)
            .create_index(
                IndexModel::builder()
                .keys(keys)
                .build()
            )
            .await
            .map_err(backend_error)?;

        Ok(())
    }

    async fn shutdown(self) -> DocumentStoreResult<()> {
        self.shutdown().await
    }
}

pub struct MongoDbStoreBuilder {
    dsn: String,
    database: String,
}

impl MongoDbStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
        }
    }
}

#[async_trait]
impl StoreBackendBuilder for MongoDbStoreBuilder {
    type Backend = MongoDbStore;

    /// Parses the connection string and creates the client.
    ///
    /// The driver connects lazily, so an unreachable server surfaces on first use.
    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        Ok(MongoDbStore::new(
            Client::with_options(
                ClientOptions::parse(&self.dsn)
                    .await
                    .map_err(|e| DocumentStoreError::Initialization(e.to_string()))?,
            )
            .map_err(|e| DocumentStoreError::Initialization(e.to_string()))?,
            self.database,
        ))
    }
}
