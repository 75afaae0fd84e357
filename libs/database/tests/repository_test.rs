//! Integration tests for the generic document repository
//!
//! These run against real MongoDB via testcontainers and pin down the
//! repository's contract: identifier validation, structural validation on
//! create and update, partial-patch semantics, query option ordering, and
//! inline reference expansion.

use chrono::{DateTime, Utc};
use database::{
    BaseRepository, Entity, EntityPatch, Expand, QueryOptions, RepositoryError, uuid_bson,
};
use mongodb::bson::doc;
use serde::{Deserialize, Serialize};
use test_utils::TestMongo;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
struct Shelf {
    #[serde(rename = "_id", alias = "id")]
    id: Uuid,
    #[validate(length(min = 1))]
    label: String,
}

impl Entity for Shelf {
    const COLLECTION: &'static str = "shelves";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
struct Book {
    #[serde(rename = "_id", alias = "id")]
    id: Uuid,
    #[validate(length(min = 1, max = 100))]
    title: String,
    shelf_id: Uuid,
    #[validate(range(min = 0))]
    copies: i32,
    created_at: DateTime<Utc>,
}

impl Entity for Book {
    const COLLECTION: &'static str = "books";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Default)]
struct BookPatch {
    title: Option<String>,
    copies: Option<i32>,
}

impl EntityPatch<Book> for BookPatch {
    fn apply(self, book: &mut Book) {
        if let Some(title) = self.title {
            book.title = title;
        }
        if let Some(copies) = self.copies {
            book.copies = copies;
        }
    }
}

#[derive(Debug, Deserialize)]
struct BookWithShelf {
    #[serde(flatten)]
    book: Book,
    shelf: Shelf,
}

const SHELF_EXPAND: Expand = Expand {
    from: Shelf::COLLECTION,
    local_field: "shelf_id",
    field: "shelf",
};

fn book(title: &str, shelf_id: Uuid, copies: i32) -> Book {
    Book {
        id: Uuid::now_v7(),
        title: title.to_string(),
        shelf_id,
        copies,
        created_at: Utc::now(),
    }
}

fn shelf(label: &str) -> Shelf {
    Shelf {
        id: Uuid::now_v7(),
        label: label.to_string(),
    }
}

#[tokio::test]
async fn test_create_and_find_by_id() {
    let mongo = TestMongo::new().await;
    let books: BaseRepository<Book> = BaseRepository::new(mongo.database());

    let created = books.create(book("Dune", Uuid::new_v4(), 3)).await.unwrap();

    let found = books
        .find_by_id(&created.id.to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.title, "Dune");
    assert_eq!(found.copies, 3);
}

#[tokio::test]
async fn test_find_by_id_malformed_vs_absent() {
    let mongo = TestMongo::new().await;
    let books: BaseRepository<Book> = BaseRepository::new(mongo.database());

    // Malformed id is an error...
    let malformed = books.find_by_id("not-a-uuid").await;
    assert!(matches!(malformed, Err(RepositoryError::InvalidId(_))));

    // ...while a well-formed unknown id is just absent
    let absent = books.find_by_id(&Uuid::new_v4().to_string()).await.unwrap();
    assert!(absent.is_none());
}

#[tokio::test]
async fn test_create_rejects_invalid_document_with_all_violations() {
    let mongo = TestMongo::new().await;
    let books: BaseRepository<Book> = BaseRepository::new(mongo.database());

    let result = books.create(book("", Uuid::new_v4(), -1)).await;

    match result {
        Err(RepositoryError::Validation(errors)) => {
            let fields = errors.field_errors();
            assert!(fields.contains_key("title"));
            assert!(fields.contains_key("copies"));
        }
        other => panic!("Expected validation failure, got {:?}", other),
    }

    // Nothing was persisted
    assert_eq!(books.count(doc! {}).await.unwrap(), 0);
}

#[tokio::test]
async fn test_update_applies_partial_patch_and_revalidates() {
    let mongo = TestMongo::new().await;
    let books: BaseRepository<Book> = BaseRepository::new(mongo.database());

    let created = books.create(book("Dune", Uuid::new_v4(), 3)).await.unwrap();

    let updated = books
        .update(
            &created.id.to_string(),
            BookPatch {
                copies: Some(5),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.copies, 5);
    assert_eq!(updated.title, "Dune");

    // A patch producing an invalid document is rejected and not persisted
    let rejected = books
        .update(
            &created.id.to_string(),
            BookPatch {
                title: Some(String::new()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(rejected, Err(RepositoryError::Validation(_))));

    let current = books
        .find_by_id(&created.id.to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(current.title, "Dune");

    // Updating an absent entity is a distinct outcome
    let absent = books
        .update(&Uuid::new_v4().to_string(), BookPatch::default())
        .await
        .unwrap();
    assert!(absent.is_none());
}

#[tokio::test]
async fn test_delete_is_idempotent_and_returns_removed() {
    let mongo = TestMongo::new().await;
    let books: BaseRepository<Book> = BaseRepository::new(mongo.database());

    let created = books.create(book("Dune", Uuid::new_v4(), 3)).await.unwrap();

    let removed = books.delete(&created.id.to_string()).await.unwrap();
    assert_eq!(removed.unwrap().id, created.id);

    let again = books.delete(&created.id.to_string()).await.unwrap();
    assert!(again.is_none());
}

#[tokio::test]
async fn test_find_many_applies_sort_skip_limit_in_order() {
    let mongo = TestMongo::new().await;
    let books: BaseRepository<Book> = BaseRepository::new(mongo.database());

    let shelf_id = Uuid::new_v4();
    for title in ["c", "a", "d", "b"] {
        books.create(book(title, shelf_id, 1)).await.unwrap();
    }

    // Sorted: a b c d; skip 1 -> b c d; limit 2 -> b c
    let page = books
        .find_many(
            doc! { "shelf_id": uuid_bson(shelf_id) },
            QueryOptions::new().sort(doc! { "title": 1 }).skip(1).limit(2),
        )
        .await
        .unwrap();

    let titles: Vec<_> = page.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["b", "c"]);
}

#[tokio::test]
async fn test_find_one_returns_first_match() {
    let mongo = TestMongo::new().await;
    let books: BaseRepository<Book> = BaseRepository::new(mongo.database());

    let shelf_id = Uuid::new_v4();
    books.create(book("Dune", shelf_id, 1)).await.unwrap();

    let found = books
        .find_one(doc! { "shelf_id": uuid_bson(shelf_id), "title": "Dune" })
        .await
        .unwrap();
    assert!(found.is_some());

    let missing = books
        .find_one(doc! { "shelf_id": uuid_bson(shelf_id), "title": "Neuromancer" })
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_expansion_resolves_references_inline() {
    let mongo = TestMongo::new().await;
    let books: BaseRepository<Book> = BaseRepository::new(mongo.database());
    let shelves: BaseRepository<Shelf> = BaseRepository::new(mongo.database());

    let fiction = shelves.create(shelf("Fiction")).await.unwrap();
    let created = books.create(book("Dune", fiction.id, 3)).await.unwrap();
    // A book whose shelf no longer resolves is dropped from expanded reads
    books.create(book("Orphan", Uuid::new_v4(), 1)).await.unwrap();

    let row: BookWithShelf = books
        .find_by_id_expanded(&created.id.to_string(), &[SHELF_EXPAND])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.book.title, "Dune");
    assert_eq!(row.shelf.label, "Fiction");

    let rows: Vec<BookWithShelf> = books
        .find_many_expanded(
            doc! {},
            &[SHELF_EXPAND],
            QueryOptions::new().sort(doc! { "title": 1 }),
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].shelf.label, "Fiction");
}

#[tokio::test]
async fn test_aggregate_groups_rows() {
    let mongo = TestMongo::new().await;
    let books: BaseRepository<Book> = BaseRepository::new(mongo.database());

    let shelf_a = Uuid::new_v4();
    let shelf_b = Uuid::new_v4();
    books.create(book("a1", shelf_a, 1)).await.unwrap();
    books.create(book("a2", shelf_a, 1)).await.unwrap();
    books.create(book("b1", shelf_b, 1)).await.unwrap();

    #[derive(Debug, Deserialize)]
    struct ShelfCount {
        count: i64,
    }

    let rows: Vec<ShelfCount> = books
        .aggregate(vec![
            doc! { "$group": { "_id": "$shelf_id", "count": { "$sum": 1 } } },
            doc! { "$project": { "_id": 0, "count": 1 } },
        ])
        .await
        .unwrap();

    let mut counts: Vec<i64> = rows.iter().map(|r| r.count).collect();
    counts.sort();
    assert_eq!(counts, vec![1, 2]);
}
