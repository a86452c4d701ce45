use crate::cache::SetCache;
use crate::error::CacheError;
use crate::load::{backup_path, read_text_if_exists};
use crate::provider::{BoosterSource, CatalogProvider};
use crate::schema::{SavedCollection, COLLECTION_VERSION};
use anyhow::Context;
use packsim_core::{by_collector_number, CardWithQuantity, Collection};
use std::fs;
use std::path::Path;
use tracing::warn;

/// An absent file is an empty collection. Files from a newer version are read
/// as far as their shape allows.
pub fn load_collection(path: &Path) -> anyhow::Result<Collection> {
    let Some(raw) =
        read_text_if_exists(path).with_context(|| format!("read {}", path.display()))?
    else {
        return Ok(Collection::new());
    };
    let saved: SavedCollection =
        serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    if saved.version > COLLECTION_VERSION {
        warn!(
            found = saved.version,
            supported = COLLECTION_VERSION,
            "collection file is newer than this build, loading what it can"
        );
    }
    Ok(saved.collection)
}

/// Writes the collection, first copying any existing file to `<path>.old`.
pub fn save_collection(path: &Path, collection: &Collection) -> anyhow::Result<()> {
    if path.exists() {
        let backup = backup_path(path);
        fs::copy(path, &backup).with_context(|| format!("backup {}", backup.display()))?;
    }
    let payload = SavedCollection {
        version: COLLECTION_VERSION,
        collection: collection.clone(),
    };
    let body = serde_json::to_string(&payload).context("serialize collection")?;
    fs::write(path, body).with_context(|| format!("write {}", path.display()))
}

/// Set id encoded in a card id (`sv3pt5-25` -> `sv3pt5`).
pub fn set_id_of(card_id: &str) -> &str {
    card_id.split('-').next().unwrap_or(card_id)
}

/// Resolves every card id through the cache. Ids missing from their set are
/// skipped with a warning.
pub fn hydrate<C: CatalogProvider, B: BoosterSource>(
    collection: &Collection,
    cache: &mut SetCache<C, B>,
) -> Result<Vec<CardWithQuantity>, CacheError> {
    let mut out = Vec::with_capacity(collection.len());
    for (id, quantity) in collection.iter() {
        let cards = cache.set_cards(set_id_of(id))?;
        match cards.iter().find(|card| card.id == id) {
            Some(card) => out.push(CardWithQuantity {
                card: card.clone(),
                quantity,
            }),
            None => warn!("card {id} is no longer in its set, leaving it out"),
        }
    }
    out.sort_by(by_collector_number);
    Ok(out)
}
