//! The same behavioral checks, run against every LocalStore backend.

use kollector::model::{Collectible, CustomAttributes, RelatedSubject, Sale, SubjectKind};
use kollector::{InMemoryStore, JsonFileStore, LocalStore, SqliteStore};
use tempfile::TempDir;

fn item(id: &str, name: &str) -> Collectible {
    let mut item = Collectible::new(id, name).with_gallery(vec![format!("{}.png", id)]);
    item.attributes.estimated_value = Some("40".to_string());
    item.attributes.estimated_value_range = vec![Some(12.0), None];
    item.attributes.related_subjects = vec![
        RelatedSubject::new("Marvel", SubjectKind::AiClassified),
        RelatedSubject::new("Spider-Man", SubjectKind::UserSelectedPrimary),
    ];
    item.attributes.production_status = vec!["Vaulted".to_string(), "Exclusive".to_string()];
    item.attributes.ref_number = Some("#593".to_string());
    item.custom_attributes = Some(CustomAttributes {
        purchase_price: Some(15.0),
        user_photos: vec!["mine.jpg".to_string()],
        sale: Some(Sale {
            sold_price: Some(45.0),
            sold_platform: Some("eBay".to_string()),
            sold: true,
            ..Default::default()
        }),
        ..Default::default()
    });
    item
}

fn ids(store: &dyn LocalStore) -> Vec<String> {
    store.fetch_all().unwrap().into_iter().map(|i| i.id).collect()
}

fn check_contract(store: &dyn LocalStore) {
    // Never written
    assert!(store.fetch_all().unwrap().is_empty());
    assert_eq!(store.get("a").unwrap(), None);

    // Backfill inserts and reports count
    let batch = vec![item("a", "A"), item("b", "B"), item("c", "C")];
    assert_eq!(store.add_many(&batch).unwrap(), 3);
    assert_eq!(store.fetch_all().unwrap(), batch);

    // Idempotent and never overwriting
    assert_eq!(store.add_many(&batch).unwrap(), 0);
    assert_eq!(store.add_many(&[Collectible::new("b", "Impostor")]).unwrap(), 0);
    assert_eq!(store.get("b").unwrap(), Some(item("b", "B")));
    assert_eq!(ids(store), vec!["a", "b", "c"]);

    // Full replace
    let mut replaced = Collectible::new("b", "B2");
    replaced.in_collection = false;
    store.update(&replaced).unwrap();
    assert_eq!(store.get("b").unwrap(), Some(replaced));

    // Absent ids are no-ops
    store.update(&Collectible::new("zz", "Ghost")).unwrap();
    store.update_gallery("zz", &["x.png".to_string()]).unwrap();
    store.delete("zz").unwrap();
    assert_eq!(ids(store), vec!["a", "b", "c"]);

    // Gallery-only mutation
    let before = store.get("a").unwrap().unwrap();
    let gallery = vec!["1.png".to_string(), "2.png".to_string(), "3.png".to_string()];
    store.update_gallery("a", &gallery).unwrap();
    let mut expected = before;
    expected.attributes.images.gallery = gallery;
    assert_eq!(store.get("a").unwrap(), Some(expected));

    store.update_gallery("a", &[]).unwrap();
    assert!(store.get("a").unwrap().unwrap().gallery().is_empty());

    // Existence and removal
    assert!(store.contains(&item("c", "whatever")).unwrap());
    store.delete("c").unwrap();
    assert!(!store.contains(&item("c", "whatever")).unwrap());
    assert_eq!(ids(store), vec!["a", "b"]);

    // Clear leaves a usable store
    store.clear().unwrap();
    assert!(store.fetch_all().unwrap().is_empty());
    store.add_many(&[item("d", "D")]).unwrap();
    assert_eq!(ids(store), vec!["d"]);

    // Empty ids are rejected by add_many; update treats them as absent
    assert!(store.add_many(&[Collectible::new("", "Nameless")]).is_err());
    assert_eq!(ids(store), vec!["d"]);
    let before = store.fetch_all().unwrap();
    store.update(&Collectible::new("", "Nameless")).unwrap();
    store.update(&Collectible::new("  ", "Nameless")).unwrap();
    assert_eq!(store.fetch_all().unwrap(), before);

    // Amounts survive storage bit for bit
    let mut precise = item("p", "Precise");
    precise.attributes.estimated_value_range =
        vec![Some(1.0 / 3.0), None, Some(54.781751339831196)];
    if let Some(custom) = precise.custom_attributes.as_mut() {
        custom.purchase_price = Some(54.781751339831196);
        if let Some(sale) = custom.sale.as_mut() {
            sale.sold_price = Some(0.1 + 0.2);
        }
    }
    store.add_many(&[precise.clone()]).unwrap();
    assert_eq!(store.get("p").unwrap(), Some(precise.clone()));
    store.update(&precise).unwrap();
    assert_eq!(store.get("p").unwrap(), Some(precise));
}

#[test]
fn test_contract_in_memory() {
    check_contract(&InMemoryStore::new());
}

#[test]
fn test_contract_json_file() {
    let dir = TempDir::new().unwrap();
    check_contract(&JsonFileStore::open(dir.path().join("collectibles.json")));
}

#[test]
fn test_contract_sqlite_in_memory() {
    check_contract(&SqliteStore::open_in_memory().unwrap());
}

#[test]
fn test_contract_sqlite_file() {
    let dir = TempDir::new().unwrap();
    check_contract(&SqliteStore::open(dir.path().join("collectibles.sqlite")).unwrap());
}

#[test]
fn test_contract_through_box() {
    let store: Box<dyn LocalStore> = Box::new(InMemoryStore::new());
    check_contract(&store);
}
