//! Generic document repository over a single MongoDB collection.
//!
//! [`BaseRepository`] provides type-safe CRUD primitives with no domain
//! policy. Domain services hold one repository per collection and layer
//! their own rules (ownership scoping, referential checks, aggregations)
//! on top of these primitives.
//!
//! Identifier handling: entity ids cross the API boundary as raw strings,
//! and the repository owns their validation. A malformed id fails with
//! [`RepositoryError::InvalidId`]; a well-formed id that matches nothing
//! yields `Ok(None)`. The two outcomes stay distinct all the way up.

use futures_util::TryStreamExt;
use mongodb::bson::{Bson, Document, doc, to_bson};
use mongodb::{Collection, Database, bson};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

/// Binding between an entity type and its collection.
pub trait Entity:
    Clone + Serialize + DeserializeOwned + Validate + Send + Sync + Unpin + 'static
{
    /// Name of the MongoDB collection the entity lives in.
    const COLLECTION: &'static str;

    /// The entity's primary key (stored as `_id`).
    fn id(&self) -> Uuid;
}

/// A partial update that can be applied to an entity in place.
///
/// Fields the patch does not carry are left untouched; the repository
/// re-validates the patched document before persisting it.
pub trait EntityPatch<T>: Send {
    fn apply(self, entity: &mut T);
}

/// A reference to resolve inline when reading, in the manner of an SQL
/// join (realized as `$lookup` + `$unwind`).
#[derive(Debug, Clone, Copy)]
pub struct Expand {
    /// Foreign collection to read from.
    pub from: &'static str,
    /// Field on this collection holding the foreign id.
    pub local_field: &'static str,
    /// Output field the resolved document is stored under.
    pub field: &'static str,
}

/// Sort, skip and limit options for list queries.
///
/// The store applies sort before skip and skip before limit.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub sort: Option<Document>,
    pub limit: Option<i64>,
    pub skip: Option<u64>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort(mut self, sort: Document) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }
}

/// Errors raised by the repository layer.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// The supplied id is not a well-formed identifier for the store.
    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    /// Structural validation of the document failed. Every violated
    /// field is carried, not just the first.
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] bson::de::Error),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Bson value for a Uuid key, matching the entities' serde representation
/// (Uuid keys serialize as strings).
///
/// Use when building `_id` or foreign-key filters by hand.
pub fn uuid_bson(id: Uuid) -> Bson {
    to_bson(&id).unwrap_or(Bson::Null)
}

/// Generic CRUD repository over one entity collection.
///
/// Held by domain services through composition; carries no domain policy.
pub struct BaseRepository<T: Entity> {
    collection: Collection<T>,
}

impl<T: Entity> Clone for BaseRepository<T> {
    fn clone(&self) -> Self {
        Self {
            collection: self.collection.clone(),
        }
    }
}

impl<T: Entity> BaseRepository<T> {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<T>(T::COLLECTION),
        }
    }

    /// Get the underlying collection for advanced operations (index
    /// creation, collection-specific commands).
    pub fn collection(&self) -> &Collection<T> {
        &self.collection
    }

    /// Validate a raw identifier into the store's key type.
    ///
    /// Exposed so domain services can build `_id` filters while keeping
    /// identifier validation a repository concern.
    pub fn parse_id(raw: &str) -> RepositoryResult<Uuid> {
        Uuid::parse_str(raw).map_err(|_| RepositoryError::InvalidId(raw.to_string()))
    }

    fn id_filter(id: Uuid) -> Document {
        doc! { "_id": uuid_bson(id) }
    }

    fn expansion_stages(expand: &[Expand]) -> Vec<Document> {
        let mut stages = Vec::with_capacity(expand.len() * 2);
        for e in expand {
            stages.push(doc! {
                "$lookup": {
                    "from": e.from,
                    "localField": e.local_field,
                    "foreignField": "_id",
                    "as": e.field,
                }
            });
            // Unwind the single-element lookup result; rows whose
            // reference no longer resolves are dropped.
            stages.push(doc! { "$unwind": format!("${}", e.field) });
        }
        stages
    }

    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    pub async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<T>> {
        let id = Self::parse_id(id)?;
        let entity = self.collection.find_one(Self::id_filter(id)).await?;
        Ok(entity)
    }

    /// `find_by_id` with the named references resolved inline. `R` is the
    /// caller's expanded row type.
    #[instrument(skip(self, expand), fields(collection = T::COLLECTION))]
    pub async fn find_by_id_expanded<R>(
        &self,
        id: &str,
        expand: &[Expand],
    ) -> RepositoryResult<Option<R>>
    where
        R: DeserializeOwned,
    {
        let id = Self::parse_id(id)?;
        let mut pipeline = vec![doc! { "$match": Self::id_filter(id) }];
        pipeline.extend(Self::expansion_stages(expand));

        let mut rows = self.aggregate::<R>(pipeline).await?;
        Ok(rows.pop())
    }

    /// First entity matching a conjunction filter, or `None`.
    #[instrument(skip(self, filter), fields(collection = T::COLLECTION))]
    pub async fn find_one(&self, filter: Document) -> RepositoryResult<Option<T>> {
        let entity = self.collection.find_one(filter).await?;
        Ok(entity)
    }

    /// All entities matching a filter, honoring sort, skip and limit.
    #[instrument(skip(self, filter, options), fields(collection = T::COLLECTION))]
    pub async fn find_many(
        &self,
        filter: Document,
        options: QueryOptions,
    ) -> RepositoryResult<Vec<T>> {
        let find_options = mongodb::options::FindOptions::builder()
            .sort(options.sort)
            .skip(options.skip)
            .limit(options.limit)
            .build();

        let cursor = self
            .collection
            .find(filter)
            .with_options(find_options)
            .await?;
        let entities: Vec<T> = cursor.try_collect().await?;

        Ok(entities)
    }

    /// `find_many` with the named references resolved inline.
    #[instrument(skip(self, filter, expand, options), fields(collection = T::COLLECTION))]
    pub async fn find_many_expanded<R>(
        &self,
        filter: Document,
        expand: &[Expand],
        options: QueryOptions,
    ) -> RepositoryResult<Vec<R>>
    where
        R: DeserializeOwned,
    {
        let mut pipeline = vec![doc! { "$match": filter }];
        if let Some(sort) = options.sort {
            pipeline.push(doc! { "$sort": sort });
        }
        if let Some(skip) = options.skip {
            pipeline.push(doc! { "$skip": skip as i64 });
        }
        if let Some(limit) = options.limit {
            pipeline.push(doc! { "$limit": limit });
        }
        // References are resolved after paging so the lookup only runs
        // over the returned page.
        pipeline.extend(Self::expansion_stages(expand));

        self.aggregate(pipeline).await
    }

    /// Validate and persist a new entity, returning the stored document.
    #[instrument(skip(self, entity), fields(collection = T::COLLECTION))]
    pub async fn create(&self, entity: T) -> RepositoryResult<T> {
        entity.validate()?;

        self.collection.insert_one(&entity).await?;

        tracing::debug!(id = %entity.id(), "Document created");
        Ok(entity)
    }

    /// Apply a partial patch to an existing entity.
    ///
    /// Loads the document, applies the patch, re-validates the result and
    /// replaces it. Returns `Ok(None)` when no entity with that id exists;
    /// a validation failure of the patched document is a distinct error.
    #[instrument(skip(self, patch), fields(collection = T::COLLECTION))]
    pub async fn update<P>(&self, id: &str, patch: P) -> RepositoryResult<Option<T>>
    where
        P: EntityPatch<T>,
    {
        let id = Self::parse_id(id)?;
        let filter = Self::id_filter(id);

        let Some(mut entity) = self.collection.find_one(filter.clone()).await? else {
            return Ok(None);
        };

        patch.apply(&mut entity);
        entity.validate()?;

        self.collection.replace_one(filter, &entity).await?;

        tracing::debug!(id = %id, "Document updated");
        Ok(Some(entity))
    }

    /// Idempotently remove an entity, returning the removed document.
    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    pub async fn delete(&self, id: &str) -> RepositoryResult<Option<T>> {
        let id = Self::parse_id(id)?;
        let removed = self
            .collection
            .find_one_and_delete(Self::id_filter(id))
            .await?;

        if removed.is_some() {
            tracing::debug!(id = %id, "Document deleted");
        }
        Ok(removed)
    }

    /// Count of entities matching a filter.
    #[instrument(skip(self, filter), fields(collection = T::COLLECTION))]
    pub async fn count(&self, filter: Document) -> RepositoryResult<u64> {
        let count = self.collection.count_documents(filter).await?;
        Ok(count)
    }

    /// Run a raw aggregation pipeline, deserializing each result row.
    ///
    /// Escape hatch for grouped aggregations the typed primitives do not
    /// cover (statistics pipelines).
    #[instrument(skip(self, pipeline), fields(collection = T::COLLECTION))]
    pub async fn aggregate<R>(&self, pipeline: Vec<Document>) -> RepositoryResult<Vec<R>>
    where
        R: DeserializeOwned,
    {
        let mut cursor = self.collection.aggregate(pipeline).await?;

        let mut rows = Vec::new();
        while let Some(document) = cursor.try_next().await? {
            rows.push(bson::from_document(document)?);
        }
        Ok(rows)
    }
}
