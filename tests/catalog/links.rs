use home_inventory::catalog::{LinkAmounts, NewInventoryProduct, ProductInput};
use home_inventory::model::PackageUnit;
use home_inventory::InventoryError;
use uuid::Uuid;

use crate::{pantry, setup};

fn product(name: &str) -> ProductInput {
    ProductInput {
        name: name.into(),
        description: None,
        supposed_price: 0.99,
        unit: PackageUnit::Pack,
    }
}

fn track(name: &str, existing: f64, desired: f64) -> NewInventoryProduct {
    NewInventoryProduct {
        product_name: name.into(),
        existing_amount: existing,
        desired_amount: desired,
    }
}

#[test]
fn add_and_list_joined_with_products() {
    let (engine, catalog) = setup();
    let inventory = pantry(&engine);
    let milk = catalog.create_product(product("Milk")).unwrap();
    catalog.create_product(product("Butter")).unwrap();

    let view = catalog
        .add_inventory_product(inventory.id, track("Milk", 1.0, 3.0), "alice")
        .unwrap();
    assert_eq!(view.product_id, milk.id);
    assert_eq!(view.product_price, 0.99);
    assert_eq!(view.unit, PackageUnit::Pack);

    catalog
        .add_inventory_product(inventory.id, track("Butter", 0.0, 1.0), "alice")
        .unwrap();

    let names: Vec<String> = catalog
        .list_inventory_products(inventory.id, "alice")
        .unwrap()
        .into_iter()
        .map(|v| v.product_name)
        .collect();
    assert_eq!(names, vec!["Butter", "Milk"]);
}

#[test]
fn add_guards() {
    let (engine, catalog) = setup();
    let inventory = pantry(&engine);
    catalog.create_product(product("Milk")).unwrap();
    catalog
        .add_inventory_product(inventory.id, track("Milk", 1.0, 3.0), "alice")
        .unwrap();

    let twice = catalog.add_inventory_product(inventory.id, track("Milk", 5.0, 5.0), "alice");
    assert!(matches!(twice, Err(InventoryError::Conflict(_))));

    let unknown_product =
        catalog.add_inventory_product(inventory.id, track("Bread", 1.0, 1.0), "alice");
    assert!(matches!(unknown_product, Err(InventoryError::NotFound(_))));

    let unknown_inventory =
        catalog.add_inventory_product(Uuid::new_v4(), track("Milk", 1.0, 1.0), "alice");
    assert!(matches!(unknown_inventory, Err(InventoryError::NotFound(_))));

    let negative =
        catalog.add_inventory_product(inventory.id, track("Milk", -1.0, 1.0), "alice");
    assert!(matches!(negative, Err(InventoryError::Validation(_))));

    let amounts = catalog.list_inventory_products(inventory.id, "alice").unwrap();
    assert_eq!(amounts.len(), 1);
    assert_eq!(amounts[0].existing_amount, 1.0);
}

#[test]
fn update_amounts() {
    let (engine, catalog) = setup();
    let inventory = pantry(&engine);
    let milk = catalog.create_product(product("Milk")).unwrap();
    catalog
        .add_inventory_product(inventory.id, track("Milk", 1.0, 3.0), "alice")
        .unwrap();

    let link = catalog
        .update_inventory_product(
            inventory.id,
            milk.id,
            LinkAmounts {
                existing_amount: 2.5,
                desired_amount: 6.0,
            },
            "alice",
        )
        .unwrap();
    assert_eq!(link.existing_amount, 2.5);
    assert_eq!(link.desired_amount, 6.0);

    let view = &catalog.list_inventory_products(inventory.id, "alice").unwrap()[0];
    assert_eq!(view.existing_amount, 2.5);
    assert_eq!(view.desired_amount, 6.0);

    let unlinked = catalog.update_inventory_product(
        inventory.id,
        Uuid::new_v4(),
        LinkAmounts {
            existing_amount: 1.0,
            desired_amount: 1.0,
        },
        "alice",
    );
    assert!(matches!(unlinked, Err(InventoryError::NotFound(_))));

    let infinite = catalog.update_inventory_product(
        inventory.id,
        milk.id,
        LinkAmounts {
            existing_amount: f64::INFINITY,
            desired_amount: 1.0,
        },
        "alice",
    );
    assert!(matches!(infinite, Err(InventoryError::Validation(_))));
}

#[test]
fn remove_by_product_name() {
    let (engine, catalog) = setup();
    let inventory = pantry(&engine);
    catalog.create_product(product("Milk")).unwrap();
    catalog.create_product(product("Eggs")).unwrap();
    catalog
        .add_inventory_product(inventory.id, track("Milk", 1.0, 3.0), "alice")
        .unwrap();

    catalog.remove_inventory_product(inventory.id, "Milk", "alice").unwrap();
    assert!(catalog.list_inventory_products(inventory.id, "alice").unwrap().is_empty());

    let again = catalog.remove_inventory_product(inventory.id, "Milk", "alice");
    assert!(matches!(again, Err(InventoryError::NotFound(_))));

    let never_linked = catalog.remove_inventory_product(inventory.id, "Eggs", "alice");
    assert!(matches!(never_linked, Err(InventoryError::NotFound(_))));

    let unknown = catalog.remove_inventory_product(inventory.id, "Bread", "alice");
    assert!(matches!(unknown, Err(InventoryError::NotFound(_))));
}

#[test]
fn stock_is_members_only() {
    let (engine, catalog) = setup();
    let inventory = pantry(&engine);
    let milk = catalog.create_product(product("Milk")).unwrap();
    engine.add_member(inventory.id, "bob", "alice").unwrap();

    catalog
        .add_inventory_product(inventory.id, track("Milk", 1.0, 3.0), "bob")
        .unwrap();

    let outsider = "mallory";
    assert!(matches!(
        catalog.list_inventory_products(inventory.id, outsider),
        Err(InventoryError::Forbidden(_))
    ));
    assert!(matches!(
        catalog.update_inventory_product(
            inventory.id,
            milk.id,
            LinkAmounts {
                existing_amount: 0.0,
                desired_amount: 0.0,
            },
            outsider,
        ),
        Err(InventoryError::Forbidden(_))
    ));
    assert!(matches!(
        catalog.remove_inventory_product(inventory.id, "Milk", outsider),
        Err(InventoryError::Forbidden(_))
    ));

    let views = catalog.list_inventory_products(inventory.id, "alice").unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].existing_amount, 1.0);
}
