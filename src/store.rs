//! Record stores over an injected persistence port.
//!
//! Each store keeps its whole collection in memory and writes the full
//! serialized array back through the [`Storage`] port after every mutation.
//! Absent data loads as an empty collection; malformed data is an error.

use crate::error::{PlannerError, Result};
use crate::model::{Project, User, new_id};
use log::{debug, info};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const USERS_KEY: &str = "users";
pub const PROJECTS_KEY: &str = "projects";

/// Key-value persistence port.
pub trait Storage {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&self, key: &str, value: &str) -> Result<()>;
}

impl<S: Storage + ?Sized> Storage for &S {
    fn load(&self, key: &str) -> Result<Option<String>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        (**self).save(key, value)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key under a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// A persisted record with a store-assigned id.
pub trait Record: Clone + Serialize + DeserializeOwned {
    const KIND: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
}

impl Record for User {
    const KIND: &'static str = "user";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Record for Project {
    const KIND: &'static str = "project";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

pub struct RecordStore<R: Record, S: Storage> {
    key: &'static str,
    records: Vec<R>,
    storage: S,
}

pub type UserStore<S> = RecordStore<User, S>;
pub type ProjectStore<S> = RecordStore<Project, S>;

impl<R: Record, S: Storage> RecordStore<R, S> {
    pub fn load(key: &'static str, storage: S) -> Result<Self> {
        let records = match storage.load(key)? {
            Some(raw) if !raw.trim().is_empty() => {
                serde_json::from_str(&raw).map_err(|source| PlannerError::Corrupt {
                    key: key.to_string(),
                    source,
                })?
            }
            _ => Vec::new(),
        };
        debug!("loaded {} {} records from `{key}`", records.len(), R::KIND);
        Ok(Self {
            key,
            records,
            storage,
        })
    }

    pub fn all(&self) -> &[R] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&R> {
        self.records.iter().find(|record| record.id() == id)
    }

    /// Appends a copy of `record` under a freshly generated id.
    pub fn add(&mut self, mut record: R) -> Result<String> {
        let id = new_id();
        record.set_id(id.clone());
        self.records.push(record);
        self.persist()?;
        info!("added {} {id}", R::KIND);
        Ok(id)
    }

    /// Replaces the record with the same id. Returns `false` if none matched.
    pub fn edit(&mut self, record: R) -> Result<bool> {
        let Some(slot) = self.records.iter_mut().find(|r| r.id() == record.id()) else {
            return Ok(false);
        };
        let id = record.id().to_string();
        *slot = record;
        self.persist()?;
        info!("edited {} {id}", R::KIND);
        Ok(true)
    }

    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let before = self.records.len();
        self.records.retain(|record| record.id() != id);
        let removed = self.records.len() != before;
        self.persist()?;
        if removed {
            info!("deleted {} {id}", R::KIND);
        }
        Ok(removed)
    }

    fn persist(&self) -> Result<()> {
        let raw = serde_json::to_string(&self.records)?;
        self.storage.save(self.key, &raw)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExpertiseArea, ExpertiseAreas};

    #[test]
    fn add_assigns_id_and_persists() {
        let storage = MemoryStorage::new();
        let mut users: UserStore<&MemoryStorage> = RecordStore::load(USERS_KEY, &storage).unwrap();
        let id = users
            .add(User::new("Ana", ExpertiseAreas::with(&[ExpertiseArea::Backend])))
            .unwrap();
        assert!(!id.is_empty());
        assert!(storage.raw(USERS_KEY).unwrap().contains("\"Ana\""));

        let reloaded: UserStore<&MemoryStorage> = RecordStore::load(USERS_KEY, &storage).unwrap();
        assert_eq!(reloaded.all(), users.all());
    }

    #[test]
    fn edit_replaces_by_id_only() {
        let storage = MemoryStorage::new();
        let mut projects: ProjectStore<&MemoryStorage> =
            RecordStore::load(PROJECTS_KEY, &storage).unwrap();
        let id = projects.add(Project::new("Site", "marketing")).unwrap();

        let mut edited = projects.get(&id).cloned().unwrap();
        edited.name = "Site v2".into();
        assert!(projects.edit(edited).unwrap());
        assert_eq!(projects.get(&id).unwrap().name, "Site v2");
        let reloaded: ProjectStore<&MemoryStorage> = RecordStore::load(PROJECTS_KEY, &storage).unwrap();
        assert_eq!(reloaded.get(&id).unwrap().name, "Site v2");

        let mut stranger = Project::new("Ghost", "x");
        stranger.id = "nope".into();
        assert!(!projects.edit(stranger).unwrap());
        assert_eq!(projects.len(), 1);
    }

    #[test]
    fn delete_removes_record() {
        let storage = MemoryStorage::new();
        let mut users: UserStore<&MemoryStorage> = RecordStore::load(USERS_KEY, &storage).unwrap();
        let id = users.add(User::new("Bo", ExpertiseAreas::default())).unwrap();
        assert!(users.delete(&id).unwrap());
        assert!(users.is_empty());
        assert!(!users.delete(&id).unwrap());
        assert_eq!(storage.raw(USERS_KEY).as_deref(), Some("[]"));
    }

    #[test]
    fn malformed_storage_is_rejected() {
        let storage = MemoryStorage::new();
        storage.save(USERS_KEY, "{not json").unwrap();
        let result: Result<UserStore<&MemoryStorage>> = RecordStore::load(USERS_KEY, &storage);
        assert!(matches!(result, Err(PlannerError::Corrupt { .. })));
    }
}
