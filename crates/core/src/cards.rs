use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    #[serde(rename = "Double Rare")]
    DoubleRare,
    #[serde(rename = "Ultra Rare")]
    UltraRare,
    #[serde(rename = "Illustration Rare")]
    IllustrationRare,
    #[serde(rename = "Special Illustration Rare")]
    SpecialIllustrationRare,
    #[serde(rename = "Hyper Rare")]
    HyperRare,
}

impl Rarity {
    pub const ALL: [Rarity; 8] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::DoubleRare,
        Rarity::UltraRare,
        Rarity::IllustrationRare,
        Rarity::SpecialIllustrationRare,
        Rarity::HyperRare,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Common => "Common",
            Self::Uncommon => "Uncommon",
            Self::Rare => "Rare",
            Self::DoubleRare => "Double Rare",
            Self::UltraRare => "Ultra Rare",
            Self::IllustrationRare => "Illustration Rare",
            Self::SpecialIllustrationRare => "Special Illustration Rare",
            Self::HyperRare => "Hyper Rare",
        }
    }

    /// Maps a catalog rarity string onto the enumeration. Catalog rarities outside
    /// it ("Promo", "Rare Holo", ...) yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|rarity| rarity.label() == label)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub set: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_code: Option<String>,
    pub number: u32,
    pub name: String,
    pub rarity: Rarity,
    pub image: String,
}

/// Parses the leading digits of a collector number ("123", "12a", "GG01" -> 0).
pub fn collector_number(raw: &str) -> u32 {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(|ch| ch.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Every rarity maps to a list, possibly empty.
#[derive(Debug, Clone, Default)]
pub struct CardsByRarity {
    buckets: [Vec<Card>; 8],
}

impl CardsByRarity {
    pub fn partition(cards: &[Card]) -> Self {
        let mut out = Self::default();
        for card in cards {
            out.buckets[card.rarity.index()].push(card.clone());
        }
        out
    }

    pub fn get(&self, rarity: Rarity) -> &[Card] {
        &self.buckets[rarity.index()]
    }

    /// Union of the given rarities, in the order the rarities are listed.
    pub fn pool(&self, rarities: &[Rarity]) -> Vec<&Card> {
        rarities
            .iter()
            .flat_map(|rarity| self.get(*rarity).iter())
            .collect()
    }

    pub fn total(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }
}
