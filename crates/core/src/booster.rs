use crate::config::REVERSE_HOLO_POOL;
use crate::{BoosterConfig, Card, CardsByRarity, RandomSource, RateTable, Rarity, SlotChance};
use thiserror::Error;

const LEGACY_COMMONS: usize = 4;
const LEGACY_UNCOMMONS: usize = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoosterError {
    #[error("slot {slot} has no entries")]
    EmptySlot { slot: usize },
    #[error("slot {slot}: no cards with rarity {rarities}")]
    EmptyPool { slot: usize, rarities: String },
    #[error("slot {slot}: every eligible card is already in the pack")]
    PoolExhausted { slot: usize },
}

/// How packs are assembled for a set.
#[derive(Debug, Clone, PartialEq)]
pub enum BoosterModel {
    Slots(BoosterConfig),
    Legacy(RateTable),
}

impl BoosterModel {
    pub fn open<R: RandomSource + ?Sized>(
        &self,
        cards: &CardsByRarity,
        rng: &mut R,
    ) -> Result<Vec<Card>, BoosterError> {
        match self {
            BoosterModel::Slots(config) => generate(cards, config, rng),
            BoosterModel::Legacy(rates) => generate_legacy(cards, rates, rng),
        }
    }
}

/// Walks `chances` in order, subtracting each chance from `roll`, and returns the
/// first entry that drives the remainder negative.
pub fn pick_chance(chances: &[SlotChance], roll: f64) -> Option<usize> {
    let mut remaining = roll;
    for (idx, entry) in chances.iter().enumerate() {
        remaining -= entry.chance;
        if remaining < 0.0 {
            return Some(idx);
        }
    }
    None
}

/// Draws one card per slot. When a slot's chances sum below the roll, its last
/// entry is used.
pub fn generate<R: RandomSource + ?Sized>(
    cards: &CardsByRarity,
    config: &BoosterConfig,
    rng: &mut R,
) -> Result<Vec<Card>, BoosterError> {
    let mut pack: Vec<Card> = Vec::with_capacity(config.len());
    for (slot, chances) in config.slots.iter().enumerate() {
        let Some(last) = chances.len().checked_sub(1) else {
            return Err(BoosterError::EmptySlot { slot });
        };
        let roll = rng.next_f64();
        let entry = &chances[pick_chance(chances, roll).unwrap_or(last)];
        let pool = cards.pool(&entry.rarities);
        if pool.is_empty() {
            return Err(empty_pool(slot, &entry.rarities));
        }
        let card = if entry.allow_duplicates {
            pool[rng.next_index(pool.len())]
        } else {
            let fresh: Vec<&Card> = pool
                .into_iter()
                .filter(|card| !pack.iter().any(|drawn| drawn.id == card.id))
                .collect();
            if fresh.is_empty() {
                return Err(BoosterError::PoolExhausted { slot });
            }
            fresh[rng.next_index(fresh.len())]
        };
        pack.push(card.clone());
    }
    Ok(pack)
}

/// Fixed layout: 4 commons, 3 uncommons, a hit slot, 1-2 reverse holos and a rare
/// slot. Uniqueness holds within each sub-draw only.
pub fn generate_legacy<R: RandomSource + ?Sized>(
    cards: &CardsByRarity,
    rates: &RateTable,
    rng: &mut R,
) -> Result<Vec<Card>, BoosterError> {
    let mut pack: Vec<Card> = Vec::with_capacity(10);
    pack.extend(select_unique(cards.get(Rarity::Common), LEGACY_COMMONS, rng));
    pack.extend(select_unique(cards.get(Rarity::Uncommon), LEGACY_UNCOMMONS, rng));

    let mut reverse_holos = 1;
    let hit = rates.hit_chances();
    match pick_chance(&hit, rng.next_f64()) {
        Some(idx) => {
            let card = draw_any(cards, &hit[idx].rarities, pack.len(), rng)?;
            pack.push(card);
        }
        None => reverse_holos += 1,
    }

    let reverse_pool = cards.pool(&REVERSE_HOLO_POOL);
    pack.extend(
        select_unique(&reverse_pool, reverse_holos, rng)
            .into_iter()
            .cloned(),
    );

    let rare = rates.rare_chances();
    let idx = pick_chance(&rare, rng.next_f64()).unwrap_or(rare.len() - 1);
    let card = draw_any(cards, &rare[idx].rarities, pack.len(), rng)?;
    pack.push(card);
    Ok(pack)
}

/// Picks `n` distinct positions of `pool`. A pool no larger than `n` comes back
/// whole, in its original order.
pub fn select_unique<T: Clone, R: RandomSource + ?Sized>(
    pool: &[T],
    n: usize,
    rng: &mut R,
) -> Vec<T> {
    if pool.len() <= n {
        return pool.to_vec();
    }
    let mut chosen: Vec<usize> = Vec::with_capacity(n);
    while chosen.len() < n {
        let idx = rng.next_index(pool.len());
        if !chosen.contains(&idx) {
            chosen.push(idx);
        }
    }
    chosen.into_iter().map(|idx| pool[idx].clone()).collect()
}

fn draw_any<R: RandomSource + ?Sized>(
    cards: &CardsByRarity,
    rarities: &[Rarity],
    slot: usize,
    rng: &mut R,
) -> Result<Card, BoosterError> {
    let pool = cards.pool(rarities);
    if pool.is_empty() {
        return Err(empty_pool(slot, rarities));
    }
    Ok(pool[rng.next_index(pool.len())].clone())
}

fn empty_pool(slot: usize, rarities: &[Rarity]) -> BoosterError {
    let rarities = rarities
        .iter()
        .map(|rarity| rarity.label())
        .collect::<Vec<_>>()
        .join(" | ");
    BoosterError::EmptyPool { slot, rarities }
}
