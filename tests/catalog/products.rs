use home_inventory::catalog::{NewInventoryProduct, ProductInput};
use home_inventory::model::PackageUnit;
use home_inventory::InventoryError;

use crate::{pantry, setup};

fn input(name: &str, price: f64) -> ProductInput {
    ProductInput {
        name: name.into(),
        description: Some("1 l carton".into()),
        supposed_price: price,
        unit: PackageUnit::Liter,
    }
}

#[test]
fn create_and_get_by_name() {
    let (_, catalog) = setup();

    let milk = catalog.create_product(input("Milk", 1.25)).unwrap();

    assert_eq!(milk.name, "Milk");
    assert_eq!(milk.unit, PackageUnit::Liter);
    assert_eq!(catalog.get_product("Milk").unwrap(), milk);
    assert_eq!(catalog.list_products().unwrap(), vec![milk]);
}

#[test]
fn names_are_unique_and_case_sensitive() {
    let (_, catalog) = setup();
    catalog.create_product(input("Milk", 1.0)).unwrap();

    let dup = catalog.create_product(input("Milk", 2.0)).unwrap_err();
    assert!(matches!(dup, InventoryError::Conflict(_)));
    assert_eq!(dup.status_code(), 409);

    assert!(catalog.create_product(input("milk", 2.0)).is_ok());
    assert!(matches!(
        catalog.get_product("MILK"),
        Err(InventoryError::NotFound(_))
    ));
}

#[test]
fn create_rejects_bad_input() {
    let (_, catalog) = setup();

    assert!(matches!(
        catalog.create_product(input(" ", 1.0)),
        Err(InventoryError::Validation(_))
    ));
    assert!(matches!(
        catalog.create_product(input("Milk", -1.0)),
        Err(InventoryError::Validation(_))
    ));
    assert!(catalog.list_products().unwrap().is_empty());
}

#[test]
fn update_keeps_id_and_may_rename() {
    let (_, catalog) = setup();
    let milk = catalog.create_product(input("Milk", 1.0)).unwrap();

    let oat = catalog.update_product("Milk", input("Oat milk", 2.0)).unwrap();

    assert_eq!(oat.id, milk.id);
    assert_eq!(oat.supposed_price, 2.0);
    assert!(catalog.get_product("Milk").is_err());
    assert_eq!(catalog.get_product("Oat milk").unwrap(), oat);

    // Keeping the same name is not a conflict.
    assert!(catalog.update_product("Oat milk", input("Oat milk", 2.5)).is_ok());
}

#[test]
fn update_guards() {
    let (_, catalog) = setup();
    catalog.create_product(input("Milk", 1.0)).unwrap();
    catalog.create_product(input("Eggs", 3.0)).unwrap();

    let onto_other = catalog.update_product("Milk", input("Eggs", 1.0));
    assert!(matches!(onto_other, Err(InventoryError::Conflict(_))));

    let missing = catalog.update_product("Bread", input("Bread", 1.0));
    assert!(matches!(missing, Err(InventoryError::NotFound(_))));

    let bad_price = catalog.update_product("Milk", input("Milk", f64::NAN));
    assert!(matches!(bad_price, Err(InventoryError::Validation(_))));
}

#[test]
fn delete_cascades_to_links() {
    let (engine, catalog) = setup();
    let inventory = pantry(&engine);
    catalog.create_product(input("Milk", 1.0)).unwrap();
    catalog
        .add_inventory_product(
            inventory.id,
            NewInventoryProduct {
                product_name: "Milk".into(),
                existing_amount: 1.0,
                desired_amount: 2.0,
            },
            "alice",
        )
        .unwrap();

    catalog.delete_product("Milk").unwrap();

    assert!(catalog.list_inventory_products(inventory.id, "alice").unwrap().is_empty());
    assert!(matches!(
        catalog.delete_product("Milk"),
        Err(InventoryError::NotFound(_))
    ));
}
