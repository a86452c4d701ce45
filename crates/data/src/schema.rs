use packsim_core::{BoosterConfig, Card, Collection};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 2;
pub const COLLECTION_VERSION: u32 = 1;
pub const INDEX_FILE: &str = "index.lock";

/// Known on-disk layouts of the set cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    /// Card lists only, no booster configuration.
    CardsOnly,
    /// Card lists plus per-set booster configuration.
    Boosters,
    Unknown(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Migration {
    Current,
    /// Drop the whole cache directory and start from an empty index.
    Invalidate,
}

impl SchemaVersion {
    pub fn from_raw(version: u32) -> Self {
        match version {
            1 => Self::CardsOnly,
            2 => Self::Boosters,
            other => Self::Unknown(other),
        }
    }

    pub fn migration(self) -> Migration {
        match self {
            Self::Boosters => Migration::Current,
            Self::CardsOnly | Self::Unknown(_) => Migration::Invalidate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub id: String,
    /// Every identifier that resolves to this entry.
    pub satisfies: Vec<String>,
    pub file_name: String,
}

impl IndexEntry {
    pub fn new(id: &str, aliases: &[&str]) -> Self {
        let mut satisfies: Vec<String> = Vec::with_capacity(aliases.len() + 1);
        for alias in std::iter::once(id).chain(aliases.iter().copied()) {
            if !satisfies.iter().any(|known| known == alias) {
                satisfies.push(alias.to_string());
            }
        }
        Self {
            id: id.to_string(),
            satisfies,
            file_name: record_file_name(id),
        }
    }

    pub fn satisfies(&self, requested: &str) -> bool {
        self.satisfies.iter().any(|alias| alias == requested)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheIndex {
    pub version: u32,
    pub sets: Vec<IndexEntry>,
}

impl CacheIndex {
    pub fn empty() -> Self {
        Self {
            version: SCHEMA_VERSION,
            sets: Vec::new(),
        }
    }

    /// Position of the first entry whose aliases contain `requested`.
    pub fn position(&self, requested: &str) -> Option<usize> {
        self.sets.iter().position(|entry| entry.satisfies(requested))
    }

    pub fn resolve(&self, requested: &str) -> Option<&IndexEntry> {
        self.position(requested).map(|idx| &self.sets[idx])
    }
}

impl Default for CacheIndex {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedSetRecord {
    pub version: u32,
    #[serde(rename = "setID")]
    pub set_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booster: Option<BoosterConfig>,
    pub cards: Vec<Card>,
}

/// A record that passed validation and is held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSet {
    pub set_id: String,
    pub cards: Vec<Card>,
    pub booster: BoosterConfig,
}

impl CachedSetRecord {
    pub fn into_cached(self) -> Result<CachedSet, String> {
        if self.version != SCHEMA_VERSION {
            return Err(format!(
                "record version {} (expected {})",
                self.version, SCHEMA_VERSION
            ));
        }
        let Some(booster) = self.booster else {
            return Err("record has no booster configuration".to_string());
        };
        Ok(CachedSet {
            set_id: self.set_id,
            cards: self.cards,
            booster,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedCollection {
    pub version: u32,
    pub collection: Collection,
}

pub fn record_file_name(set_id: &str) -> String {
    format!("{set_id}.json")
}
