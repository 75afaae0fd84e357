//! Integration tests for the Products domain
//!
//! These tests use real MongoDB via testcontainers to ensure:
//! - Ownership scoping is enforced on every operation
//! - The category reference is validated against the caller's categories
//! - Partial updates leave untouched fields unchanged
//! - The statistics aggregation groups and joins correctly

use database::{QueryOptions, RepositoryError, uuid_bson};
use domain_categories::{Category, CategoryService, CreateCategory};
use domain_products::*;
use mongodb::bson::doc;
use test_utils::{TestDataBuilder, TestMongo, assertions::*};
use uuid::Uuid;

async fn owned_category(mongo: &TestMongo, owner: Uuid, name: &str) -> Category {
    CategoryService::new(mongo.database())
        .create(
            CreateCategory {
                name: name.to_string(),
            },
            owner,
        )
        .await
        .unwrap()
}

fn product_input(name: &str, category_id: Uuid, price: f64, stock: i32) -> CreateProduct {
    CreateProduct {
        name: name.to_string(),
        category_id,
        price,
        stock,
    }
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_preserves_inputs_and_round_trips_with_category() {
    let mongo = TestMongo::new().await;
    let service = ProductService::new(mongo.database());
    let builder = TestDataBuilder::from_test_name("create_round_trip");
    let owner = builder.user_id();

    let category = owned_category(&mongo, owner, &builder.name("category", "main")).await;

    let created = service
        .create(product_input("Keyboard", category.id, 49.99, 12), owner)
        .await
        .unwrap();

    assert_uuid_eq(created.owner_id, owner, "owner_id");
    assert_uuid_eq(created.category_id, category.id, "category_id");
    assert_eq!(created.price, 49.99);
    assert_eq!(created.stock, 12);

    // Fetching by id resolves the category object, not just its id
    let fetched = service
        .get_by_owner(&created.id.to_string(), owner)
        .await
        .unwrap();
    assert_uuid_eq(fetched.product.id, created.id, "round-tripped product id");
    assert_eq!(fetched.category.name, category.name);
    assert_uuid_eq(fetched.category.id, category.id, "expanded category id");
}

#[tokio::test]
async fn test_create_with_foreign_owned_category_fails() {
    let mongo = TestMongo::new().await;
    let service = ProductService::new(mongo.database());

    let owner = Uuid::new_v4();
    let other_owner = Uuid::new_v4();
    let foreign_category = owned_category(&mongo, other_owner, "Foreign").await;

    let result = service
        .create(product_input("Keyboard", foreign_category.id, 10.0, 1), owner)
        .await;
    assert!(matches!(
        result,
        Err(ProductError::InvalidReference("category"))
    ));
}

#[tokio::test]
async fn test_create_with_absent_category_fails() {
    let mongo = TestMongo::new().await;
    let service = ProductService::new(mongo.database());

    let result = service
        .create(
            product_input("Keyboard", Uuid::new_v4(), 10.0, 1),
            Uuid::new_v4(),
        )
        .await;
    assert!(matches!(
        result,
        Err(ProductError::InvalidReference("category"))
    ));
}

#[tokio::test]
async fn test_create_reports_bad_category_before_field_validation() {
    let mongo = TestMongo::new().await;
    let service = ProductService::new(mongo.database());

    // Both the category reference and the fields are invalid; the
    // reference failure wins.
    let result = service
        .create(
            product_input("", Uuid::new_v4(), -1.0, -1),
            Uuid::new_v4(),
        )
        .await;
    assert!(matches!(
        result,
        Err(ProductError::InvalidReference("category"))
    ));
}

#[tokio::test]
async fn test_create_with_valid_category_aggregates_field_violations() {
    let mongo = TestMongo::new().await;
    let service = ProductService::new(mongo.database());
    let owner = Uuid::new_v4();

    let category = owned_category(&mongo, owner, "Valid").await;

    let result = service
        .create(product_input("", category.id, -1.0, -1), owner)
        .await;

    match result {
        Err(ProductError::Repository(RepositoryError::Validation(errors))) => {
            let fields = errors.field_errors();
            // Every violation is reported, not just the first
            assert!(fields.contains_key("name"));
            assert!(fields.contains_key("price"));
            assert!(fields.contains_key("stock"));
        }
        other => panic!("Expected aggregated validation failure, got {:?}", other),
    }
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn test_partial_update_leaves_unpatched_fields_unchanged() {
    let mongo = TestMongo::new().await;
    let service = ProductService::new(mongo.database());
    let owner = Uuid::new_v4();

    let category = owned_category(&mongo, owner, "Main").await;
    let created = service
        .create(product_input("Keyboard", category.id, 49.99, 12), owner)
        .await
        .unwrap();

    let updated = service
        .update(
            &created.id.to_string(),
            UpdateProduct {
                price: Some(59.99),
                ..Default::default()
            },
            owner,
        )
        .await
        .unwrap();

    assert_eq!(updated.price, 59.99);
    assert_eq!(updated.stock, created.stock);
    assert_eq!(updated.name, created.name);
    assert_uuid_eq(updated.category_id, created.category_id, "category_id");
}

#[tokio::test]
async fn test_update_revalidates_category_reference() {
    let mongo = TestMongo::new().await;
    let service = ProductService::new(mongo.database());
    let owner = Uuid::new_v4();

    let category = owned_category(&mongo, owner, "Main").await;
    let foreign_category = owned_category(&mongo, Uuid::new_v4(), "Foreign").await;

    let created = service
        .create(product_input("Keyboard", category.id, 49.99, 12), owner)
        .await
        .unwrap();

    let result = service
        .update(
            &created.id.to_string(),
            UpdateProduct {
                category_id: Some(foreign_category.id),
                ..Default::default()
            },
            owner,
        )
        .await;
    assert!(matches!(
        result,
        Err(ProductError::InvalidReference("category"))
    ));

    // A patch that does not touch the category skips the re-check
    let updated = service
        .update(
            &created.id.to_string(),
            UpdateProduct {
                stock: Some(3),
                ..Default::default()
            },
            owner,
        )
        .await
        .unwrap();
    assert_eq!(updated.stock, 3);
}

#[tokio::test]
async fn test_update_and_delete_by_non_owner_collapse_to_not_found() {
    let mongo = TestMongo::new().await;
    let service = ProductService::new(mongo.database());
    let owner = Uuid::new_v4();
    let intruder = Uuid::new_v4();

    let category = owned_category(&mongo, owner, "Main").await;
    let created = service
        .create(product_input("Keyboard", category.id, 49.99, 12), owner)
        .await
        .unwrap();

    let patch = UpdateProduct {
        price: Some(0.01),
        ..Default::default()
    };

    // Non-owner on an existing product...
    let foreign_update = service
        .update(&created.id.to_string(), patch.clone(), intruder)
        .await;
    let foreign_delete = service.delete(&created.id.to_string(), intruder).await;

    // ...fails identically to a non-existent id
    let missing_update = service
        .update(&Uuid::new_v4().to_string(), patch, owner)
        .await;
    let missing_delete = service.delete(&Uuid::new_v4().to_string(), owner).await;

    assert!(matches!(foreign_update, Err(ProductError::NotFound)));
    assert!(matches!(missing_update, Err(ProductError::NotFound)));
    assert!(matches!(foreign_delete, Err(ProductError::NotFound)));
    assert!(matches!(missing_delete, Err(ProductError::NotFound)));

    // The product is still there for its owner
    let still_there = service
        .get_by_owner(&created.id.to_string(), owner)
        .await
        .unwrap();
    assert_eq!(still_there.product.stock, 12);
}

#[tokio::test]
async fn test_malformed_id_is_distinct_from_absent_id() {
    let mongo = TestMongo::new().await;
    let service = ProductService::new(mongo.database());
    let owner = Uuid::new_v4();

    let malformed = service.delete("not-a-uuid", owner).await;
    assert!(matches!(
        malformed,
        Err(ProductError::Repository(RepositoryError::InvalidId(_)))
    ));

    let absent = service.delete(&Uuid::new_v4().to_string(), owner).await;
    assert!(matches!(absent, Err(ProductError::NotFound)));
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn test_delete_returns_removed_product() {
    let mongo = TestMongo::new().await;
    let service = ProductService::new(mongo.database());
    let owner = Uuid::new_v4();

    let category = owned_category(&mongo, owner, "Main").await;
    let created = service
        .create(product_input("Keyboard", category.id, 49.99, 12), owner)
        .await
        .unwrap();

    let removed = service
        .delete(&created.id.to_string(), owner)
        .await
        .unwrap();
    assert_uuid_eq(removed.id, created.id, "removed product id");

    let gone = service.get_by_owner(&created.id.to_string(), owner).await;
    assert!(matches!(gone, Err(ProductError::NotFound)));
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_list_sorts_by_name_ascending() {
    let mongo = TestMongo::new().await;
    let service = ProductService::new(mongo.database());
    let owner = Uuid::new_v4();

    let category = owned_category(&mongo, owner, "Main").await;
    service
        .create(product_input("Product 2", category.id, 2.0, 2), owner)
        .await
        .unwrap();
    service
        .create(product_input("Product 1", category.id, 1.0, 1), owner)
        .await
        .unwrap();

    let listed = service
        .list_by_owner(owner, QueryOptions::new().sort(doc! { "name": 1 }))
        .await
        .unwrap();

    let names: Vec<_> = listed.iter().map(|p| p.product.name.as_str()).collect();
    assert_eq!(names, vec!["Product 1", "Product 2"]);
}

#[tokio::test]
async fn test_list_skip_and_limit_return_second_item() {
    let mongo = TestMongo::new().await;
    let service = ProductService::new(mongo.database());
    let owner = Uuid::new_v4();

    let category = owned_category(&mongo, owner, "Main").await;
    for name in ["Product 1", "Product 2", "Product 3"] {
        service
            .create(product_input(name, category.id, 1.0, 1), owner)
            .await
            .unwrap();
    }

    let page = service
        .list_by_owner(
            owner,
            QueryOptions::new().sort(doc! { "name": 1 }).skip(1).limit(1),
        )
        .await
        .unwrap();

    assert_eq!(page.len(), 1);
    assert_eq!(page[0].product.name, "Product 2");
}

#[tokio::test]
async fn test_list_never_leaks_other_owners_products() {
    let mongo = TestMongo::new().await;
    let service = ProductService::new(mongo.database());
    let owner = Uuid::new_v4();
    let other = Uuid::new_v4();

    let mine = owned_category(&mongo, owner, "Mine").await;
    let theirs = owned_category(&mongo, other, "Theirs").await;

    service
        .create(product_input("Visible", mine.id, 1.0, 1), owner)
        .await
        .unwrap();
    service
        .create(product_input("Hidden", theirs.id, 1.0, 1), other)
        .await
        .unwrap();

    let listed = service
        .list_by_owner(owner, QueryOptions::new())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].product.name, "Visible");

    assert_eq!(service.count_by_owner(owner).await.unwrap(), 1);
}

// ============================================================================
// Statistics
// ============================================================================

#[tokio::test]
async fn test_statistics_counts_and_breakdown() {
    let mongo = TestMongo::new().await;
    let service = ProductService::new(mongo.database());
    let owner = Uuid::new_v4();

    let category = owned_category(&mongo, owner, "Shared").await;
    service
        .create(product_input("Low", category.id, 1.0, 5), owner)
        .await
        .unwrap();
    service
        .create(product_input("High", category.id, 1.0, 50), owner)
        .await
        .unwrap();

    let stats = service.statistics(owner).await.unwrap();

    assert_eq!(stats.total_products, 2);
    // Threshold is 10 units; only the stock-5 product is below it
    assert_eq!(stats.low_stock_products, 1);
    assert_eq!(stats.category_breakdown.len(), 1);
    assert_eq!(stats.category_breakdown[0].category_name, "Shared");
    assert_eq!(stats.category_breakdown[0].count, 2);
}

#[tokio::test]
async fn test_statistics_omit_unused_categories_and_scope_to_owner() {
    let mongo = TestMongo::new().await;
    let service = ProductService::new(mongo.database());
    let owner = Uuid::new_v4();
    let other = Uuid::new_v4();

    let books = owned_category(&mongo, owner, "Books").await;
    let toys = owned_category(&mongo, owner, "Toys").await;
    // A category with zero products never shows up
    owned_category(&mongo, owner, "Empty").await;
    let foreign = owned_category(&mongo, other, "Foreign").await;

    service
        .create(product_input("Dune", books.id, 9.0, 3), owner)
        .await
        .unwrap();
    service
        .create(product_input("Neuromancer", books.id, 8.0, 30), owner)
        .await
        .unwrap();
    service
        .create(product_input("Yo-yo", toys.id, 4.0, 100), owner)
        .await
        .unwrap();
    service
        .create(product_input("Unseen", foreign.id, 1.0, 1), other)
        .await
        .unwrap();

    let stats = service.statistics(owner).await.unwrap();

    assert_eq!(stats.total_products, 3);
    assert_eq!(stats.low_stock_products, 1);

    // Breakdown ordering is unspecified; assert set membership and counts
    let mut breakdown: Vec<(String, i64)> = stats
        .category_breakdown
        .into_iter()
        .map(|c| (c.category_name, c.count))
        .collect();
    breakdown.sort();
    assert_eq!(
        breakdown,
        vec![("Books".to_string(), 2), ("Toys".to_string(), 1)]
    );
}

#[tokio::test]
async fn test_statistics_for_empty_owner() {
    let mongo = TestMongo::new().await;
    let service = ProductService::new(mongo.database());

    let stats = service.statistics(Uuid::new_v4()).await.unwrap();
    assert_eq!(stats.total_products, 0);
    assert_eq!(stats.low_stock_products, 0);
    assert!(stats.category_breakdown.is_empty());
}

// ============================================================================
// Index bootstrap
// ============================================================================

#[tokio::test]
async fn test_init_indexes_is_idempotent() {
    let mongo = TestMongo::new().await;
    let service = ProductService::new(mongo.database());

    service.init_indexes().await.unwrap();
    service.init_indexes().await.unwrap();

    // The collection stays usable after index bootstrap
    let owner = Uuid::new_v4();
    let category = owned_category(&mongo, owner, "Main").await;
    service
        .create(product_input("Keyboard", category.id, 49.99, 12), owner)
        .await
        .unwrap();

    // Filters built with uuid_bson match the entities' serde form
    let raw = mongo
        .database()
        .collection::<mongodb::bson::Document>("products")
        .count_documents(doc! { "owner_id": uuid_bson(owner) })
        .await
        .unwrap();
    assert_eq!(raw, 1);
}
