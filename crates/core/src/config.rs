use crate::Rarity;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One weighted entry of a slot. `chance` is consumed cumulatively with the
/// entries before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SlotChance {
    pub rarities: Vec<Rarity>,
    pub chance: f64,
    #[serde(default = "default_allow_duplicates")]
    pub allow_duplicates: bool,
}

fn default_allow_duplicates() -> bool {
    true
}

impl SlotChance {
    pub fn new(rarities: &[Rarity], chance: f64, allow_duplicates: bool) -> Self {
        Self {
            rarities: rarities.to_vec(),
            chance,
            allow_duplicates,
        }
    }
}

pub type Slot = Vec<SlotChance>;

/// Structural problems in a booster layout. Slots and entries are zero-based.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("booster has no slots")]
    NoSlots,
    #[error("slot {slot} has no entries")]
    EmptySlot { slot: usize },
    #[error("slot {slot} entry {entry} lists no rarities")]
    NoRarities { slot: usize, entry: usize },
    #[error("slot {slot} entry {entry} has chance {chance}, expected a value in (0, 1]")]
    ChanceOutOfRange {
        slot: usize,
        entry: usize,
        chance: f64,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoosterConfig {
    pub slots: Vec<Slot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateTable {
    pub double_rare: f64,
    pub ultra_rare: f64,
    pub illustration_rare: f64,
    pub special_illustration_rare: f64,
    pub hyper_rare: f64,
}

impl RateTable {
    pub const STANDARD: RateTable = RateTable {
        double_rare: 0.1376,
        ultra_rare: 0.0657,
        illustration_rare: 0.0767,
        special_illustration_rare: 0.0315,
        hyper_rare: 0.0185,
    };

    pub fn hit_chances(&self) -> Vec<SlotChance> {
        vec![
            SlotChance::new(&[Rarity::IllustrationRare], self.illustration_rare, true),
            SlotChance::new(
                &[Rarity::SpecialIllustrationRare],
                self.special_illustration_rare,
                true,
            ),
            SlotChance::new(&[Rarity::HyperRare], self.hyper_rare, true),
        ]
    }

    pub fn rare_chances(&self) -> Vec<SlotChance> {
        vec![
            SlotChance::new(&[Rarity::DoubleRare], self.double_rare, true),
            SlotChance::new(&[Rarity::UltraRare], self.ultra_rare, true),
            SlotChance::new(&[Rarity::Rare], 1.0, true),
        ]
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::STANDARD
    }
}

pub(crate) const REVERSE_HOLO_POOL: [Rarity; 3] = [Rarity::Common, Rarity::Uncommon, Rarity::Rare];

impl BoosterConfig {
    pub fn new(slots: Vec<Slot>) -> Self {
        Self { slots }
    }

    /// Ten-card pack equivalent to the fixed legacy layout. The hit slot's leftover
    /// mass becomes a reverse holo, so every pack has the same length.
    pub fn from_rates(rates: &RateTable) -> Self {
        let mut slots = Vec::new();
        for _ in 0..4 {
            slots.push(vec![SlotChance::new(&[Rarity::Common], 1.0, false)]);
        }
        for _ in 0..3 {
            slots.push(vec![SlotChance::new(&[Rarity::Uncommon], 1.0, false)]);
        }
        let mut hit = rates.hit_chances();
        hit.push(SlotChance::new(&REVERSE_HOLO_POOL, 1.0, false));
        slots.push(hit);
        slots.push(vec![SlotChance::new(&REVERSE_HOLO_POOL, 1.0, false)]);
        slots.push(rates.rare_chances());
        Self { slots }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slots.is_empty() {
            return Err(ConfigError::NoSlots);
        }
        for (slot, chances) in self.slots.iter().enumerate() {
            if chances.is_empty() {
                return Err(ConfigError::EmptySlot { slot });
            }
            for (entry, chance) in chances.iter().enumerate() {
                if chance.rarities.is_empty() {
                    return Err(ConfigError::NoRarities { slot, entry });
                }
                if !(chance.chance > 0.0 && chance.chance <= 1.0) {
                    return Err(ConfigError::ChanceOutOfRange {
                        slot,
                        entry,
                        chance: chance.chance,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
