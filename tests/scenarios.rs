#![cfg(all(feature = "memory-store", feature = "memory-cache"))]

use futures::executor::block_on;
use storefront_guard::{
    Action, CacheKey, CategoryId, CommentId, Decision, Denial, Engine, EngineBuilder, Error,
    LikeId, MemoryCache, MemoryStore, Mutation, Principal, ProductId, Resource, ResourceRef,
    UserId, Write, keys,
};

type TestEngine = Engine<MemoryStore, MemoryCache<String>>;

fn uid(value: u64) -> UserId {
    UserId::new(value).unwrap()
}

fn engine_with(resources: &[Resource]) -> TestEngine {
    let store = MemoryStore::new();
    for resource in resources {
        store.insert(*resource);
    }
    EngineBuilder::new(store).cache(MemoryCache::new()).build()
}

fn warm(engine: &TestEngine, key: &CacheKey) {
    let value = block_on(engine.read_through(key, || async { Ok("cached".to_string()) })).unwrap();
    assert_eq!(value, "cached");
    assert!(engine.cache().contains(key.as_str()));
}

#[test]
fn anonymous_comment_is_unauthenticated() {
    let product = Resource::product(ProductId::new(1).unwrap(), None);
    let engine = engine_with(&[product]);

    let comment = Resource::comment(CommentId::new(1).unwrap(), uid(1));
    let result = block_on(engine.apply(&Principal::anonymous(), Mutation::Create(comment)));

    assert!(matches!(result, Err(Error::Denied(Denial::Unauthenticated))));
    assert!(engine.store().commits().is_empty());
}

#[test]
fn non_owner_cannot_delete_comment() {
    let comment = Resource::comment(CommentId::new(1).unwrap(), uid(1));
    let engine = engine_with(&[comment]);

    let result = block_on(engine.apply(&Principal::user(uid(2)), Mutation::Delete(comment.reference())));

    match result {
        Err(Error::Denied(denial)) => assert_eq!(denial.status_code(), 403),
        other => panic!("expected 403, got {other:?}"),
    }
    assert_eq!(engine.store().get(comment.reference()), Some(comment));
}

#[test]
fn owner_and_staff_can_delete_likes() {
    let own = Resource::like(LikeId::new(1).unwrap(), uid(1));
    let other = Resource::like(LikeId::new(2).unwrap(), uid(1));
    let engine = engine_with(&[own, other]);

    block_on(engine.apply(&Principal::user(uid(1)), Mutation::Delete(own.reference()))).unwrap();
    block_on(engine.apply(&Principal::staff(uid(9)), Mutation::Delete(other.reference()))).unwrap();

    assert!(engine.store().get(own.reference()).is_none());
    assert!(engine.store().get(other.reference()).is_none());
}

#[test]
fn recreating_foreign_like_is_a_conflict() {
    let like = Resource::like(LikeId::new(1).unwrap(), uid(1));
    let engine = engine_with(&[like]);

    let result = block_on(engine.apply(&Principal::user(uid(2)), Mutation::Create(like)));

    assert!(matches!(result, Err(Error::Conflict(found)) if found == like.reference()));
    assert_eq!(engine.store().get(like.reference()).and_then(|r| r.owner()), Some(uid(1)));
    assert!(engine.store().commits().is_empty());
}

#[test]
fn recreating_product_keeps_old_category_listing_consistent() {
    let product = Resource::product(ProductId::new(42).unwrap(), Some(CategoryId::new(7).unwrap()));
    let engine = engine_with(&[product]);
    let old_listing = keys::products_of_category(CategoryId::new(7).unwrap());
    warm(&engine, &old_listing);

    let moved = Resource::product(ProductId::new(42).unwrap(), Some(CategoryId::new(8).unwrap()));
    let result = block_on(engine.apply(&Principal::staff(uid(1)), Mutation::Create(moved)));
    assert!(matches!(result, Err(Error::Conflict(_))));
    assert_eq!(engine.store().get(product.reference()), Some(product));

    let keys = block_on(engine.apply(&Principal::staff(uid(1)), Mutation::Update(moved))).unwrap();
    assert!(keys.contains(old_listing.as_str()));
    assert!(!engine.cache().contains(old_listing.as_str()));
}

#[test]
fn staff_toggles_depend_on_target_staff_flag() {
    let staff_target = Resource::account(uid(5), true);
    let customer_target = Resource::account(uid(6), false);
    let engine = engine_with(&[staff_target, customer_target]);
    let staff = Principal::staff(uid(1));

    assert_eq!(
        engine.decide(&staff, Action::TogglePermission, &staff_target),
        Decision::Deny
    );
    assert_eq!(
        engine.decide(&staff, Action::TogglePermission, &customer_target),
        Decision::Allow
    );

    block_on(engine.apply(&staff, Mutation::TogglePermission(uid(6)))).unwrap();
    assert_eq!(
        engine.store().get(ResourceRef::UserAccount(uid(6))),
        Some(Resource::account(uid(6), true))
    );
}

#[test]
fn product_without_category_invalidates_listing_and_detail() {
    let engine = engine_with(&[]);
    let product = Resource::product(ProductId::new(5).unwrap(), None);

    let keys = block_on(engine.apply(&Principal::staff(uid(1)), Mutation::Create(product))).unwrap();

    let keys: Vec<String> = keys.iter().map(ToString::to_string).collect();
    assert_eq!(keys, vec!["product_5".to_string(), "products".to_string()]);
}

#[test]
fn product_write_clears_warm_entries_before_fresh_read() {
    let product = Resource::product(ProductId::new(42).unwrap(), Some(CategoryId::new(7).unwrap()));
    let engine = engine_with(&[product]);

    let listing = keys::products();
    let detail = keys::product(ProductId::new(42).unwrap());
    let by_category = keys::products_of_category(CategoryId::new(7).unwrap());
    let unrelated = keys::categories();
    for key in [&listing, &detail, &by_category, &unrelated] {
        warm(&engine, key);
    }

    let invalidated =
        block_on(engine.apply(&Principal::staff(uid(1)), Mutation::Delete(product.reference())))
            .unwrap();

    assert_eq!(invalidated.len(), 3);
    assert!(!engine.cache().contains(listing.as_str()));
    assert!(!engine.cache().contains(detail.as_str()));
    assert!(!engine.cache().contains(by_category.as_str()));
    assert!(engine.cache().contains(unrelated.as_str()));
    assert_eq!(
        engine.store().commits(),
        vec![Write::Remove(product.reference())]
    );

    let fresh = block_on(engine.read_through(&detail, || async {
        Err(Error::NotFound(product.reference()))
    }));
    assert!(matches!(fresh, Err(Error::NotFound(_))));
}

#[test]
fn category_write_clears_its_product_listing() {
    let category = Resource::category(CategoryId::new(3).unwrap());
    let engine = engine_with(&[category]);
    let by_category = keys::products_of_category(CategoryId::new(3).unwrap());
    warm(&engine, &by_category);

    block_on(engine.apply(&Principal::superuser(uid(1)), Mutation::Update(category))).unwrap();

    assert!(!engine.cache().contains(by_category.as_str()));
}

#[test]
fn customer_cannot_touch_catalog() {
    let category = Resource::category(CategoryId::new(3).unwrap());
    let engine = engine_with(&[category]);

    for mutation in [
        Mutation::Create(Resource::product(ProductId::new(1).unwrap(), None)),
        Mutation::Update(category),
        Mutation::Delete(category.reference()),
    ] {
        let result = block_on(engine.apply(&Principal::user(uid(2)), mutation));
        assert!(matches!(result, Err(Error::Denied(Denial::Forbidden))));
    }
    assert!(engine.store().commits().is_empty());
}

#[test]
fn unknown_account_is_not_found() {
    let engine = engine_with(&[]);

    let result = block_on(engine.authorize(
        &Principal::anonymous(),
        Action::Read,
        ResourceRef::UserAccount(uid(77)),
    ));

    assert!(matches!(result, Err(Error::NotFound(ResourceRef::UserAccount(id))) if id == uid(77)));
}
