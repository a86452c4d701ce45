//! Alias-resolving on-disk cache of set catalogs.
//!
//! The cache directory holds one `<setID>.json` record per set and an
//! `index.lock` mapping every known alias of a set to its record file. Records
//! are written once and only replaced by a refetch.

use crate::error::CacheError;
use crate::load::{ensure_dir, load_json, write_json};
use crate::provider::{cards_query, set_query, BoosterSource, CatalogProvider};
use crate::schema::{
    CacheIndex, CachedSet, CachedSetRecord, IndexEntry, Migration, SchemaVersion, INDEX_FILE,
    SCHEMA_VERSION,
};
use packsim_core::{BoosterConfig, Card};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub struct SetCache<C, B> {
    folder: PathBuf,
    catalog: C,
    boosters: B,
    /// Loaded from disk on first use.
    index: Option<CacheIndex>,
    /// Keyed by the identifier the caller asked for.
    sets: HashMap<String, CachedSet>,
}

impl<C: CatalogProvider, B: BoosterSource> SetCache<C, B> {
    pub fn new(folder: impl Into<PathBuf>, catalog: C, boosters: B) -> Self {
        Self {
            folder: folder.into(),
            catalog,
            boosters,
            index: None,
            sets: HashMap::new(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.folder
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn set_cards(&mut self, requested: &str) -> Result<&[Card], CacheError> {
        Ok(self.cached_set(requested)?.cards.as_slice())
    }

    pub fn set_booster(&mut self, requested: &str) -> Result<&BoosterConfig, CacheError> {
        Ok(&self.cached_set(requested)?.booster)
    }

    pub fn cached_set(&mut self, requested: &str) -> Result<&CachedSet, CacheError> {
        if !self.sets.contains_key(requested) {
            let set = self.lookup_or_fetch(requested)?;
            self.sets.insert(requested.to_string(), set);
        }
        self.sets
            .get(requested)
            .ok_or_else(|| CacheError::NotFound(requested.to_string()))
    }

    pub fn resolve(&mut self, requested: &str) -> Result<Option<IndexEntry>, CacheError> {
        Ok(self.index()?.resolve(requested).cloned())
    }

    pub fn index_entries(&mut self) -> Result<&[IndexEntry], CacheError> {
        Ok(self.index()?.sets.as_slice())
    }

    fn index(&mut self) -> Result<&mut CacheIndex, CacheError> {
        if self.index.is_none() {
            let loaded = self.load_index()?;
            self.index = Some(loaded);
        }
        Ok(self.index.get_or_insert_with(CacheIndex::empty))
    }

    fn index_path(&self) -> PathBuf {
        self.folder.join(INDEX_FILE)
    }

    fn load_index(&self) -> Result<CacheIndex, CacheError> {
        let path = self.index_path();
        let index: CacheIndex = match load_json(&path) {
            Ok(Some(index)) => index,
            Ok(None) => return Ok(CacheIndex::empty()),
            Err(CacheError::Serialize(reason)) => {
                warn!(path = %path.display(), %reason, "cache index is unreadable, rebuilding");
                self.invalidate(&[])?;
                return Ok(CacheIndex::empty());
            }
            Err(err) => return Err(err),
        };
        match SchemaVersion::from_raw(index.version).migration() {
            Migration::Current => Ok(index),
            Migration::Invalidate => {
                warn!(
                    found = index.version,
                    expected = SCHEMA_VERSION,
                    "cache schema changed, discarding {} records in {}",
                    index.sets.len(),
                    self.folder.display()
                );
                self.invalidate(&index.sets)?;
                Ok(CacheIndex::empty())
            }
        }
    }

    /// Removes the index and the records it names. Nothing else in the folder is
    /// touched, since it may be shared with other files.
    fn invalidate(&self, entries: &[IndexEntry]) -> Result<(), CacheError> {
        let records = entries
            .iter()
            .filter(|entry| is_plain_file_name(&entry.file_name))
            .map(|entry| self.folder.join(&entry.file_name));
        for path in records.chain(std::iter::once(self.index_path())) {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(CacheError::io(&path, err)),
            }
        }
        Ok(())
    }

    fn save_index(&mut self) -> Result<(), CacheError> {
        ensure_dir(&self.folder)?;
        let path = self.index_path();
        let index = self.index()?;
        write_json(&path, &*index)
    }

    fn lookup_or_fetch(&mut self, requested: &str) -> Result<CachedSet, CacheError> {
        let index = self.index()?;
        if let Some(position) = index.position(requested) {
            let entry = index.sets[position].clone();
            match self.read_record(&entry) {
                Ok(set) => {
                    info!("loading {requested} from cache");
                    return Ok(set);
                }
                Err(reason) => {
                    warn!(
                        file = %entry.file_name,
                        %reason,
                        "cache seems corrupt for \"{requested}\""
                    );
                    // the orphaned record file is left in place
                    self.index()?.sets.remove(position);
                }
            }
        }
        self.fetch(requested)
    }

    fn read_record(&self, entry: &IndexEntry) -> Result<CachedSet, String> {
        let path = self.folder.join(&entry.file_name);
        let record: CachedSetRecord = match load_json(&path) {
            Ok(Some(record)) => record,
            Ok(None) => return Err(format!("{} is missing", path.display())),
            Err(err) => return Err(err.to_string()),
        };
        record.into_cached()
    }

    fn fetch(&mut self, requested: &str) -> Result<CachedSet, CacheError> {
        let found = self.catalog.find_sets(&set_query(requested))?;
        let Some(api_set) = found.first().cloned() else {
            return Err(CacheError::NotFound(requested.to_string()));
        };
        if found.len() > 1 {
            warn!(
                "found {} sets for \"{requested}\", using the first ({})",
                found.len(),
                api_set.id
            );
        }

        info!("fetching {} from the card catalog", api_set.id);
        let api_cards = self.catalog.find_cards(&cards_query(&api_set.id))?;
        let listed = api_cards.len();
        let cards: Vec<Card> = api_cards
            .into_iter()
            .filter_map(|card| card.into_card(&api_set))
            .collect();
        if cards.len() < listed {
            debug!(
                set = %api_set.id,
                skipped = listed - cards.len(),
                "cards outside booster rarities were not cached"
            );
        }
        let booster = self.boosters.booster_config(&api_set.id)?;

        let mut aliases: Vec<&str> = Vec::with_capacity(2);
        if let Some(code) = api_set.ptcgo_code.as_deref() {
            aliases.push(code);
        }
        aliases.push(requested);
        let entry = IndexEntry::new(&api_set.id, &aliases);

        let record = CachedSetRecord {
            version: SCHEMA_VERSION,
            set_id: api_set.id.clone(),
            booster: Some(booster.clone()),
            cards,
        };
        ensure_dir(&self.folder)?;
        write_json(&self.folder.join(&entry.file_name), &record)?;
        self.index()?.sets.push(entry);
        self.save_index()?;

        Ok(CachedSet {
            set_id: record.set_id,
            cards: record.cards,
            booster,
        })
    }
}

/// Rejects index file names that would reach outside the cache folder.
fn is_plain_file_name(name: &str) -> bool {
    Path::new(name).file_name().and_then(|part| part.to_str()) == Some(name)
}
