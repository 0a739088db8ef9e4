use std::collections::HashSet;

use home_inventory::catalog::NewInventoryProduct;
use home_inventory::model::{Inventory, Product};
use home_inventory::store::InventoryStore;
use home_inventory::InventoryError;
use uuid::Uuid;

use crate::support::Fixture;

fn track(fx: &Fixture, inventory: &Inventory, product: &Product) {
    fx.catalog
        .add_inventory_product(
            inventory.id,
            NewInventoryProduct {
                product_name: product.name.clone(),
                existing_amount: 1.0,
                desired_amount: 4.0,
            },
            &inventory.owner,
        )
        .unwrap();
}

#[test]
fn linked_unlinked_and_missing_ids() {
    let fx = Fixture::new();
    let inventory = fx.inventory("alice");
    let p1 = fx.product("Milk");
    let p2 = fx.product("Eggs");
    let p3 = Uuid::new_v4();
    track(&fx, &inventory, &p1);

    let report = fx
        .engine
        .bulk_remove_products(inventory.id, &[p1.id, p2.id, p3], "alice")
        .unwrap();

    assert_eq!(report.deleted_count, 1);
    assert_eq!(report.missing_ids, vec![p3]);
    assert_eq!(report.not_linked_names, vec!["Eggs".to_string()]);
    assert_eq!(fx.link_count(&inventory), 0);
}

#[test]
fn only_this_inventory_is_touched() {
    let fx = Fixture::new();
    let pantry = fx.inventory("alice");
    let cellar = fx.inventory("alice");
    let milk = fx.product("Milk");
    track(&fx, &pantry, &milk);
    track(&fx, &cellar, &milk);

    let report = fx
        .engine
        .bulk_remove_products(pantry.id, &[milk.id], "alice")
        .unwrap();

    assert_eq!(report.deleted_count, 1);
    assert_eq!(fx.link_count(&pantry), 0);
    assert_eq!(fx.link_count(&cellar), 1);
}

#[test]
fn repeated_ids_count_once() {
    let fx = Fixture::new();
    let inventory = fx.inventory("alice");
    let milk = fx.product("Milk");
    let eggs = fx.product("Eggs");
    let ghost = Uuid::new_v4();
    track(&fx, &inventory, &milk);

    let report = fx
        .engine
        .bulk_remove_products(
            inventory.id,
            &[milk.id, ghost, eggs.id, milk.id, ghost, eggs.id],
            "alice",
        )
        .unwrap();

    assert_eq!(report.deleted_count, 1);
    assert_eq!(report.missing_ids, vec![ghost]);
    assert_eq!(report.not_linked_names, vec!["Eggs".to_string()]);
}

#[test]
fn report_matches_set_arithmetic() {
    let fx = Fixture::new();
    let inventory = fx.inventory("alice");
    let products: Vec<Product> = (0..8).map(|i| fx.product(&format!("P{i}"))).collect();
    for product in products.iter().step_by(2) {
        track(&fx, &inventory, product);
    }

    let ghosts: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
    let requested: Vec<Uuid> = products
        .iter()
        .skip(1)
        .map(|p| p.id)
        .chain(ghosts.iter().copied())
        .collect();

    let linked_before: HashSet<Uuid> = fx
        .store
        .read(|r| r.list_links(inventory.id))
        .unwrap()
        .into_iter()
        .map(|l| l.product_id)
        .collect();
    let found: HashSet<Uuid> = products.iter().map(|p| p.id).collect();

    let report = fx
        .engine
        .bulk_remove_products(inventory.id, &requested, "alice")
        .unwrap();

    let r: HashSet<Uuid> = requested.iter().copied().collect();
    assert_eq!(report.deleted_count, r.intersection(&linked_before).count());

    let expected_missing: Vec<Uuid> = requested
        .iter()
        .filter(|id| !found.contains(*id))
        .copied()
        .collect();
    assert_eq!(report.missing_ids, expected_missing);

    let expected_names: Vec<String> = products
        .iter()
        .skip(1)
        .filter(|p| !linked_before.contains(&p.id))
        .map(|p| p.name.clone())
        .collect();
    assert_eq!(report.not_linked_names, expected_names);
    for ghost in &ghosts {
        assert!(!report.not_linked_names.contains(&ghost.to_string()));
    }

    // P0 was not requested and stays linked.
    assert_eq!(fx.link_count(&inventory), 1);
}

#[test]
fn empty_request_is_rejected() {
    let fx = Fixture::new();
    let inventory = fx.inventory("alice");

    let err = fx
        .engine
        .bulk_remove_products(inventory.id, &[], "alice")
        .unwrap_err();
    assert!(matches!(err, InventoryError::Validation(_)));
}

#[test]
fn unknown_inventory_is_not_found() {
    let fx = Fixture::new();
    let milk = fx.product("Milk");

    let err = fx
        .engine
        .bulk_remove_products(Uuid::new_v4(), &[milk.id], "alice")
        .unwrap_err();
    assert!(matches!(err, InventoryError::NotFound(_)));
}

#[test]
fn second_call_deletes_nothing() {
    let fx = Fixture::new();
    let inventory = fx.inventory("alice");
    let milk = fx.product("Milk");
    track(&fx, &inventory, &milk);

    fx.engine
        .bulk_remove_products(inventory.id, &[milk.id], "alice")
        .unwrap();
    let again = fx
        .engine
        .bulk_remove_products(inventory.id, &[milk.id], "alice")
        .unwrap();

    assert_eq!(again.deleted_count, 0);
    assert!(again.missing_ids.is_empty());
    assert_eq!(again.not_linked_names, vec!["Milk".to_string()]);
}

#[test]
fn members_reconcile_and_outsiders_are_refused() {
    let fx = Fixture::new();
    let inventory = fx.inventory("alice");
    fx.engine.add_member(inventory.id, "bob", "alice").unwrap();
    let milk = fx.product("Milk");
    let eggs = fx.product("Eggs");
    track(&fx, &inventory, &milk);
    track(&fx, &inventory, &eggs);

    let err = fx
        .engine
        .bulk_remove_products(inventory.id, &[milk.id, eggs.id], "mallory")
        .unwrap_err();
    assert!(matches!(err, InventoryError::Forbidden(_)));
    assert_eq!(err.status_code(), 403);
    assert_eq!(fx.link_count(&inventory), 2);

    let report = fx
        .engine
        .bulk_remove_products(inventory.id, &[milk.id], "BOB")
        .unwrap();
    assert_eq!(report.deleted_count, 1);
    assert_eq!(fx.link_count(&inventory), 1);
}
