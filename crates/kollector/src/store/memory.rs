use super::mem_backend::MemBackend;
use super::snapshot_store::SnapshotStore;

pub type InMemoryStore = SnapshotStore<MemBackend>;

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        SnapshotStore::with_backend(MemBackend::new())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::Collectible;
    use crate::store::LocalStore;

    pub struct StoreFixture {
        pub store: InMemoryStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
            }
        }

        pub fn with_items(self, count: usize) -> Self {
            let items: Vec<Collectible> = (0..count)
                .map(|i| Collectible::new(format!("item-{}", i + 1), format!("Item {}", i + 1)))
                .collect();
            self.store.add_many(&items).unwrap();
            self
        }

        pub fn with_item(self, item: Collectible) -> Self {
            self.store.add_many(&[item]).unwrap();
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::StoreFixture;
    use super::*;
    use crate::error::KollectorError;
    use crate::model::{Collectible, CustomAttributes, RelatedSubject, SubjectKind};
    use crate::store::LocalStore;

    fn detailed(id: &str) -> Collectible {
        let mut item = Collectible::new(id, "Spider-Man #593")
            .with_gallery(vec!["front.png".to_string(), "back.png".to_string()]);
        item.attributes.estimated_value_range = vec![Some(12.0), None];
        item.attributes.related_subjects =
            vec![RelatedSubject::new("Marvel", SubjectKind::AiClassified)];
        item.attributes.production_status = vec!["Vaulted".to_string()];
        item.custom_attributes = Some(CustomAttributes {
            purchase_price: Some(11.0),
            ..Default::default()
        });
        item
    }

    #[test]
    fn test_empty_store_fetches_nothing() {
        let store = InMemoryStore::new();
        assert!(store.fetch_all().unwrap().is_empty());
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn test_add_many_is_idempotent() {
        let store = InMemoryStore::new();
        let items = vec![detailed("a"), detailed("b")];

        assert_eq!(store.add_many(&items).unwrap(), 2);
        let once = store.fetch_all().unwrap();

        assert_eq!(store.add_many(&items).unwrap(), 0);
        assert_eq!(store.fetch_all().unwrap(), once);
    }

    #[test]
    fn test_add_many_never_overwrites() {
        let fixture = StoreFixture::new().with_item(detailed("x"));
        let original = fixture.store.get("x").unwrap().unwrap();

        let mut different = Collectible::new("x", "Something Else");
        different.in_collection = false;
        fixture.store.add_many(&[different]).unwrap();

        assert_eq!(fixture.store.get("x").unwrap().unwrap(), original);
    }

    #[test]
    fn test_add_many_first_duplicate_in_batch_wins() {
        let store = InMemoryStore::new();
        let first = Collectible::new("dup", "First");
        let second = Collectible::new("dup", "Second");

        assert_eq!(store.add_many(&[first, second]).unwrap(), 1);
        assert_eq!(store.get("dup").unwrap().unwrap().name(), "First");
    }

    #[test]
    fn test_add_many_rejects_empty_id_without_writing() {
        let store = InMemoryStore::new();
        let err = store
            .add_many(&[Collectible::new("ok", "Ok"), Collectible::new("", "Bad")])
            .unwrap_err();

        assert!(matches!(err, KollectorError::InvalidCollectible(_)));
        assert!(store.fetch_all().unwrap().is_empty());
    }

    #[test]
    fn test_update_with_blank_id_is_noop() {
        let fixture = StoreFixture::new().with_item(detailed("x"));
        let before = fixture.store.fetch_all().unwrap();
        let saves = fixture.store.backend().save_count();

        fixture.store.update(&Collectible::new("", "Nameless")).unwrap();

        assert_eq!(fixture.store.fetch_all().unwrap(), before);
        assert_eq!(fixture.store.backend().save_count(), saves);
    }

    #[test]
    fn test_update_replaces_whole_record() {
        let fixture = StoreFixture::new().with_item(detailed("x"));
        let replacement = Collectible::new("x", "Renamed");

        fixture.store.update(&replacement).unwrap();
        assert_eq!(fixture.store.get("x").unwrap().unwrap(), replacement);
    }

    #[test]
    fn test_update_absent_is_noop() {
        let fixture = StoreFixture::new().with_items(2);
        let saves = fixture.store.backend().save_count();

        fixture.store.update(&Collectible::new("ghost", "Ghost")).unwrap();

        assert_eq!(fixture.store.fetch_all().unwrap().len(), 2);
        assert_eq!(fixture.store.get("ghost").unwrap(), None);
        assert_eq!(fixture.store.backend().save_count(), saves);
    }

    #[test]
    fn test_update_gallery_only_touches_gallery() {
        let fixture = StoreFixture::new().with_item(detailed("x"));
        let before = fixture.store.get("x").unwrap().unwrap();

        let gallery = vec!["new-1.png".to_string()];
        fixture.store.update_gallery("x", &gallery).unwrap();
        let after = fixture.store.get("x").unwrap().unwrap();

        assert_eq!(after.gallery(), gallery.as_slice());
        let mut expected = before;
        expected.attributes.images.gallery = gallery;
        assert_eq!(after, expected);
    }

    #[test]
    fn test_update_gallery_absent_is_noop() {
        let fixture = StoreFixture::new().with_items(1);
        fixture
            .store
            .update_gallery("ghost", &["x.png".to_string()])
            .unwrap();
        assert_eq!(fixture.store.fetch_all().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_and_contains() {
        let fixture = StoreFixture::new().with_items(3);
        let target = fixture.store.get("item-2").unwrap().unwrap();
        assert!(fixture.store.contains(&target).unwrap());

        fixture.store.delete("item-2").unwrap();
        assert!(!fixture.store.contains(&target).unwrap());

        // Deleting again is fine
        fixture.store.delete("item-2").unwrap();
        let ids: Vec<String> = fixture
            .store
            .fetch_all()
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec!["item-1", "item-3"]);
    }

    #[test]
    fn test_clear_leaves_usable_store() {
        let fixture = StoreFixture::new().with_items(3);
        fixture.store.clear().unwrap();
        assert!(fixture.store.fetch_all().unwrap().is_empty());

        fixture.store.add_many(&[detailed("again")]).unwrap();
        assert_eq!(fixture.store.fetch_all().unwrap().len(), 1);
    }

    #[test]
    fn test_write_errors_propagate() {
        let fixture = StoreFixture::new().with_items(1);
        fixture.store.backend().set_simulate_write_error(true);

        let err = fixture.store.add_many(&[detailed("new")]).unwrap_err();
        assert!(matches!(err, KollectorError::Store(_)));
        assert!(fixture.store.delete("item-1").is_err());
        assert!(fixture.store.clear().is_err());

        // Nothing half-applied
        assert_eq!(fixture.store.fetch_all().unwrap().len(), 1);
    }
}
