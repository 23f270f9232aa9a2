// End-to-end checks of the add / delete / list commands against a real SQLite file

use car_inventory::{submit_add, submit_delete, CarInput, CarStore, Rejection};
use tempfile::TempDir;

fn setup() -> (TempDir, CarStore) {
    let dir = TempDir::new().unwrap();
    let store = CarStore::open(dir.path().join("cars.db")).unwrap();
    (dir, store)
}

fn add(store: &CarStore, brand: &str, model: &str, year: &str, price: &str) -> Result<i64, Rejection> {
    submit_add(store, &CarInput::new(brand, model, year, price)).map_err(|err| {
        err.rejection()
            .unwrap_or_else(|| panic!("unexpected store failure: {err}"))
    })
}

#[test]
fn novel_car_is_stored_exactly_as_entered() {
    let (_dir, store) = setup();

    let id = add(&store, "Toyota", "Corolla", "2020", "24999.99").unwrap();

    let cars = store.list_all().unwrap();
    assert_eq!(cars.len(), 1);
    assert_eq!(cars[0].id, id);
    assert_eq!(cars[0].brand, "Toyota");
    assert_eq!(cars[0].model, "Corolla");
    assert_eq!(cars[0].year, 2020);
    assert_eq!(cars[0].price, 24999.99);
}

#[test]
fn invalid_input_never_reaches_the_store() {
    let (_dir, store) = setup();

    assert_eq!(add(&store, "", "Corolla", "2020", "1"), Err(Rejection::MissingField));
    assert_eq!(add(&store, "Toy0ta", "Corolla", "2020", "1"), Err(Rejection::InvalidBrand));
    assert_eq!(add(&store, "Toyota", "Corolla", "year", "1"), Err(Rejection::NotANumber));
    assert_eq!(add(&store, "Toyota", "Corolla", "2027", "1"), Err(Rejection::YearOutOfRange));

    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn duplicate_identity_is_rejected_and_count_unchanged() {
    let (_dir, store) = setup();
    add(&store, "Toyota", "Corolla", "2020", "24999.99").unwrap();
    add(&store, "Honda", "Civic", "2018", "15000").unwrap();

    assert_eq!(add(&store, "Toyota", "Corolla", "2020", "100"), Err(Rejection::Duplicate));
    // Trimmed input maps onto the same identity
    assert_eq!(add(&store, " Toyota ", "Corolla ", "2020", "1"), Err(Rejection::Duplicate));
    assert_eq!(store.count().unwrap(), 2);
}

#[test]
fn delete_flow() {
    let (_dir, store) = setup();
    let first = add(&store, "Toyota", "Corolla", "2020", "1").unwrap();
    let second = add(&store, "Honda", "Civic", "2018", "1").unwrap();

    let err = submit_delete(&store, None).unwrap_err();
    assert_eq!(err.rejection(), Some(Rejection::NoSelection));
    assert_eq!(store.count().unwrap(), 2);

    assert_eq!(submit_delete(&store, Some(first)).unwrap(), 1);
    let remaining: Vec<i64> = store.list_all().unwrap().iter().map(|c| c.id).collect();
    assert_eq!(remaining, vec![second]);

    // Deleting it again is a silent no-op
    assert_eq!(submit_delete(&store, Some(first)).unwrap(), 0);
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn deleted_identity_can_be_added_again() {
    let (_dir, store) = setup();
    let id = add(&store, "Volvo", "240", "1988", "3500").unwrap();
    submit_delete(&store, Some(id)).unwrap();

    let again = add(&store, "Volvo", "240", "1988", "3600").unwrap();

    assert_ne!(again, id);
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn separate_handles_share_the_same_file() {
    let (dir, store) = setup();
    add(&store, "Mazda", "MX-5", "1990", "8000").unwrap();

    let reopened = CarStore::open(dir.path().join("cars.db")).unwrap();

    assert_eq!(reopened.count().unwrap(), 1);
    assert_eq!(add(&reopened, "Mazda", "MX-5", "1990", "9000"), Err(Rejection::Duplicate));
}
