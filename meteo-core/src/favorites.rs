//! Favorite cities with a cached weather snapshot, mirrored to durable storage.

use chrono::Utc;

use crate::{
    error::StorageError,
    model::{City, CurrentConditions, FavoriteEntry},
    storage::KeyValueStore,
};

/// Storage key holding the JSON-encoded favorites list.
pub const FAVORITES_KEY: &str = "weatherapp_favorites";

/// At most one entry per `(name, country)`. Every mutation rewrites the full
/// list to storage; write failures are logged and the in-memory change stands.
#[derive(Debug)]
pub struct FavoritesStore {
    entries: Vec<FavoriteEntry>,
    storage: Box<dyn KeyValueStore>,
}

impl FavoritesStore {
    /// Read the persisted list. Missing or unreadable data yields an empty store.
    pub fn load(storage: Box<dyn KeyValueStore>) -> Self {
        let entries = match storage.read(FAVORITES_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<FavoriteEntry>>(&raw) {
                Ok(entries) => dedup(entries),
                Err(e) => {
                    tracing::error!("Discarding unreadable favorites: {e}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::error!("Error loading favorites: {e}");
                Vec::new()
            }
        };

        tracing::info!("Loaded {} favorite(s)", entries.len());
        Self { entries, storage }
    }

    pub fn add(&mut self, city: &City, current: &CurrentConditions) -> bool {
        if self.contains(&city.name, &city.country) {
            tracing::debug!("{}, {} already in favorites", city.name, city.country);
            return false;
        }

        self.entries
            .push(FavoriteEntry::snapshot(city, current, Utc::now()));
        self.persist();

        tracing::info!("Added to favorites: {}", city.name);
        true
    }

    pub fn remove(&mut self, name: &str, country: &str) -> bool {
        let Some(index) = self.position(name, country) else {
            tracing::debug!("{name}, {country} not found in favorites");
            return false;
        };

        self.entries.remove(index);
        self.persist();

        tracing::info!("Removed from favorites: {name}");
        true
    }

    pub fn contains(&self, name: &str, country: &str) -> bool {
        self.position(name, country).is_some()
    }

    pub fn get(&self, name: &str, country: &str) -> Option<&FavoriteEntry> {
        self.entries.iter().find(|e| e.matches(name, country))
    }

    /// Refresh the cached temperature and weather code of an existing favorite.
    pub fn update_snapshot(
        &mut self,
        name: &str,
        country: &str,
        current: &CurrentConditions,
    ) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.matches(name, country)) else {
            return false;
        };

        entry.temperature = current.temperature;
        entry.weather_code = current.weather_code;
        entry.last_updated = Some(Utc::now());
        self.persist();

        true
    }

    /// Owned copy of the entries, in insertion order.
    pub fn list(&self) -> Vec<FavoriteEntry> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every favorite and delete the stored list.
    pub fn clear(&mut self) -> bool {
        self.entries.clear();

        match self.storage.remove(FAVORITES_KEY) {
            Ok(()) => {
                tracing::info!("Favorites cleared");
                true
            }
            Err(e) => {
                tracing::error!("Error clearing favorites: {e}");
                false
            }
        }
    }

    fn position(&self, name: &str, country: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.matches(name, country))
    }

    fn persist(&self) {
        if let Err(e) = self.try_persist() {
            tracing::error!("Error saving favorites: {e}");
        }
    }

    fn try_persist(&self) -> Result<(), StorageError> {
        let json =
            serde_json::to_string(&self.entries).map_err(|source| StorageError::Serialize {
                key: FAVORITES_KEY.to_string(),
                source,
            })?;

        self.storage.write(FAVORITES_KEY, &json)?;
        tracing::debug!("Favorites saved ({} entries)", self.entries.len());
        Ok(())
    }
}

/// Keep the first entry of each key; hand-edited files may contain repeats.
fn dedup(entries: Vec<FavoriteEntry>) -> Vec<FavoriteEntry> {
    let mut kept: Vec<FavoriteEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        if !kept.iter().any(|k| k.matches(&entry.name, &entry.country)) {
            kept.push(entry);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStore, MemoryStore};

    fn paris() -> City {
        City {
            name: "Paris".into(),
            country: "France".into(),
            region: "Île-de-France".into(),
            latitude: 48.8534,
            longitude: 2.3488,
        }
    }

    fn berlin() -> City {
        City {
            name: "Berlin".into(),
            country: "Germany".into(),
            region: "Land Berlin".into(),
            latitude: 52.5244,
            longitude: 13.4105,
        }
    }

    fn conditions(temperature: i32, weather_code: i32) -> CurrentConditions {
        CurrentConditions {
            temperature,
            wind_speed: 9.4,
            weather_code,
            humidity: Some(70),
            feels_like: temperature - 1,
            observed_at: "2024-05-01T14:00".into(),
        }
    }

    /// A backend that fails every write, to check that failures are swallowed.
    #[derive(Debug)]
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Backend {
                key: key.into(),
                reason: "disk on fire".into(),
            })
        }

        fn write(&self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Backend {
                key: key.into(),
                reason: "disk on fire".into(),
            })
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            Err(StorageError::Backend {
                key: key.into(),
                reason: "disk on fire".into(),
            })
        }
    }

    #[test]
    fn add_twice_keeps_one_entry() {
        let mut store = FavoritesStore::load(Box::new(MemoryStore::new()));

        assert!(store.add(&paris(), &conditions(18, 2)));
        assert!(!store.add(&paris(), &conditions(25, 0)));

        assert_eq!(store.len(), 1);
        assert_eq!(store.list()[0].temperature, 18);
    }

    #[test]
    fn remove_then_contains_is_false() {
        let mut store = FavoritesStore::load(Box::new(MemoryStore::new()));
        store.add(&paris(), &conditions(18, 2));

        assert!(store.remove("Paris", "France"));
        assert!(!store.contains("Paris", "France"));
        assert!(!store.remove("Paris", "France"));
    }

    #[test]
    fn key_match_is_exact() {
        let mut store = FavoritesStore::load(Box::new(MemoryStore::new()));
        store.add(&paris(), &conditions(18, 2));

        assert!(!store.contains("paris", "France"));
        assert!(!store.contains("Paris", "France "));
        assert!(!store.remove("PARIS", "France"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn update_snapshot_on_missing_key_changes_nothing() {
        let backend = MemoryStore::new();
        let mut store = FavoritesStore::load(Box::new(backend.clone()));
        store.add(&paris(), &conditions(18, 2));
        let before = store.list();
        let stored_before = backend.get(FAVORITES_KEY);

        assert!(!store.update_snapshot("Berlin", "Germany", &conditions(5, 61)));

        assert_eq!(store.list(), before);
        assert_eq!(backend.get(FAVORITES_KEY), stored_before);
    }

    #[test]
    fn update_snapshot_overwrites_weather_fields() {
        let mut store = FavoritesStore::load(Box::new(MemoryStore::new()));
        store.add(&paris(), &conditions(18, 2));

        assert!(store.update_snapshot("Paris", "France", &conditions(9, 63)));

        let entry = store.get("Paris", "France").expect("entry");
        assert_eq!(entry.temperature, 9);
        assert_eq!(entry.weather_code, 63);
        assert!(entry.last_updated.is_some());
    }

    #[test]
    fn list_is_a_copy() {
        let mut store = FavoritesStore::load(Box::new(MemoryStore::new()));
        store.add(&paris(), &conditions(18, 2));

        let mut copy = store.list();
        copy.clear();

        assert_eq!(store.len(), 1);
    }

    #[test]
    fn every_mutation_rewrites_the_full_list() {
        let backend = MemoryStore::new();
        let mut store = FavoritesStore::load(Box::new(backend.clone()));

        store.add(&paris(), &conditions(18, 2));
        store.add(&berlin(), &conditions(12, 3));
        let stored: Vec<FavoriteEntry> =
            serde_json::from_str(&backend.get(FAVORITES_KEY).expect("stored")).expect("json");
        assert_eq!(stored.len(), 2);

        store.remove("Paris", "France");
        let stored: Vec<FavoriteEntry> =
            serde_json::from_str(&backend.get(FAVORITES_KEY).expect("stored")).expect("json");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "Berlin");
    }

    #[test]
    fn reload_reproduces_entries() {
        let dir = tempfile::tempdir().expect("tempdir");

        let mut store = FavoritesStore::load(Box::new(FileStore::new(dir.path())));
        store.add(&paris(), &conditions(18, 2));
        store.add(&berlin(), &conditions(12, 3));
        store.update_snapshot("Berlin", "Germany", &conditions(11, 61));
        let before = store.list();
        drop(store);

        let reloaded = FavoritesStore::load(Box::new(FileStore::new(dir.path())));
        assert_eq!(reloaded.list(), before);
    }

    #[test]
    fn corrupt_data_loads_as_empty() {
        let backend = MemoryStore::with_value(FAVORITES_KEY, "{not json");
        let store = FavoritesStore::load(Box::new(backend));

        assert!(store.is_empty());
    }

    #[test]
    fn duplicate_keys_in_storage_are_collapsed() {
        let mut seed = FavoritesStore::load(Box::new(MemoryStore::new()));
        seed.add(&paris(), &conditions(18, 2));
        let one = serde_json::to_value(&seed.list()[0]).expect("value");
        let raw = serde_json::to_string(&[one.clone(), one]).expect("json");

        let store = FavoritesStore::load(Box::new(MemoryStore::with_value(FAVORITES_KEY, &raw)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn storage_failures_do_not_undo_mutations() {
        let mut store = FavoritesStore::load(Box::new(BrokenStore));
        assert!(store.is_empty());

        assert!(store.add(&paris(), &conditions(18, 2)));
        assert!(store.contains("Paris", "France"));
        assert!(store.update_snapshot("Paris", "France", &conditions(20, 0)));
        assert!(store.remove("Paris", "France"));
    }

    #[test]
    fn clear_empties_list_and_storage() {
        let backend = MemoryStore::new();
        let mut store = FavoritesStore::load(Box::new(backend.clone()));
        store.add(&paris(), &conditions(18, 2));

        assert!(store.clear());
        assert!(store.is_empty());
        assert!(backend.get(FAVORITES_KEY).is_none());
    }

    #[test]
    fn clear_reports_storage_failure() {
        let mut store = FavoritesStore::load(Box::new(BrokenStore));
        store.add(&paris(), &conditions(18, 2));

        assert!(!store.clear());
        assert!(store.is_empty());
    }
}
