use crate::error::ProviderError;
use crate::load::read_text_if_exists;
use packsim_core::{collector_number, BoosterConfig, Card, RateTable, Rarity};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSet {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub series: String,
    #[serde(default)]
    pub ptcgo_code: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiCardImages {
    pub small: String,
    pub large: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiCard {
    pub id: String,
    pub name: String,
    pub number: String,
    #[serde(default)]
    pub rarity: Option<String>,
    pub images: ApiCardImages,
}

impl ApiCard {
    /// `None` when the catalog rarity is not one a booster can contain.
    pub fn into_card(self, set: &ApiSet) -> Option<Card> {
        let rarity = Rarity::from_label(self.rarity.as_deref()?)?;
        Some(Card {
            number: collector_number(&self.number),
            id: self.id,
            set: set.id.clone(),
            set_code: set.ptcgo_code.clone(),
            name: self.name,
            rarity,
            image: self.images.small,
        })
    }
}

/// Remote card catalog. Queries use the pokemontcg.io search syntax.
pub trait CatalogProvider {
    fn find_sets(&self, query: &str) -> Result<Vec<ApiSet>, ProviderError>;
    fn find_cards(&self, query: &str) -> Result<Vec<ApiCard>, ProviderError>;
}

/// Per-set booster layouts, kept apart from the card catalog.
pub trait BoosterSource {
    fn booster_config(&self, set_id: &str) -> Result<BoosterConfig, ProviderError>;
}

pub fn set_query(requested: &str) -> String {
    format!("id:{requested} OR ptcgoCode:{requested}")
}

pub fn cards_query(set_id: &str) -> String {
    format!("set.id:{set_id}")
}

/// Booster layouts keyed by canonical set id. Sets without an entry get the
/// fallback layout.
#[derive(Debug, Clone, PartialEq)]
pub struct BoosterTable {
    entries: HashMap<String, BoosterConfig>,
    fallback: BoosterConfig,
}

impl BoosterTable {
    pub fn standard() -> Self {
        Self::with_fallback(BoosterConfig::from_rates(&RateTable::STANDARD))
    }

    pub fn with_fallback(fallback: BoosterConfig) -> Self {
        Self {
            entries: HashMap::new(),
            fallback,
        }
    }

    /// Reads `{ "<setID>": [[SlotChance, ...], ...], ... }`. A missing file is an
    /// empty table. Unknown keys and malformed layouts are rejected.
    pub fn load(path: &Path) -> Result<Self, ProviderError> {
        let mut table = Self::standard();
        let raw = read_text_if_exists(path)
            .map_err(|err| ProviderError::Io(format!("read {}: {err}", path.display())))?;
        let Some(raw) = raw else {
            return Ok(table);
        };
        let entries: HashMap<String, BoosterConfig> = serde_json::from_str(&raw)
            .map_err(|err| ProviderError::Decode(format!("{}: {err}", path.display())))?;
        for (set_id, config) in &entries {
            config.validate().map_err(|err| {
                ProviderError::Decode(format!("{}: set {set_id}: {err}", path.display()))
            })?;
        }
        table.entries = entries;
        Ok(table)
    }

    pub fn insert(&mut self, set_id: &str, config: BoosterConfig) {
        self.entries.insert(set_id.to_string(), config);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for BoosterTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl BoosterSource for BoosterTable {
    fn booster_config(&self, set_id: &str) -> Result<BoosterConfig, ProviderError> {
        Ok(self
            .entries
            .get(set_id)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone()))
    }
}
