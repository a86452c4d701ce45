use crate::Card;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Draw counts per card id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection {
    quantities: BTreeMap<String, u32>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_quantities(quantities: BTreeMap<String, u32>) -> Self {
        Self { quantities }
    }

    pub fn add_booster(&mut self, pack: &[Card]) {
        for card in pack {
            *self.quantities.entry(card.id.clone()).or_insert(0) += 1;
        }
    }

    pub fn quantity(&self, id: &str) -> u32 {
        self.quantities.get(id).copied().unwrap_or(0)
    }

    pub fn quantities(&self) -> &BTreeMap<String, u32> {
        &self.quantities
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.quantities.iter().map(|(id, qty)| (id.as_str(), *qty))
    }

    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    pub fn total_cards(&self) -> u64 {
        self.quantities.values().map(|qty| u64::from(*qty)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardWithQuantity {
    pub card: Card,
    pub quantity: u32,
}

/// Orders by owning set id, then collector number.
pub fn by_collector_number(a: &CardWithQuantity, b: &CardWithQuantity) -> Ordering {
    a.card
        .set
        .cmp(&b.card.set)
        .then(a.card.number.cmp(&b.card.number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rarity;

    fn card(id: &str, set: &str, number: u32) -> Card {
        Card {
            id: id.to_string(),
            set: set.to_string(),
            set_code: None,
            number,
            name: id.to_string(),
            rarity: Rarity::Common,
            image: String::new(),
        }
    }

    #[test]
    fn same_pack_twice_accumulates() {
        let a = card("sv1-1", "sv1", 1);
        let b = card("sv1-2", "sv1", 2);
        let pack = vec![a.clone(), a, b];
        let mut collection = Collection::new();
        collection.add_booster(&pack);
        collection.add_booster(&pack);
        assert_eq!(collection.quantity("sv1-1"), 4);
        assert_eq!(collection.quantity("sv1-2"), 2);
        assert_eq!(collection.quantity("sv1-3"), 0);
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.total_cards(), 6);
    }

    #[test]
    fn sorts_by_set_then_number() {
        let mut cards = vec![
            CardWithQuantity {
                card: card("sv2-3", "sv2", 3),
                quantity: 1,
            },
            CardWithQuantity {
                card: card("sv1-10", "sv1", 10),
                quantity: 1,
            },
            CardWithQuantity {
                card: card("sv1-2", "sv1", 2),
                quantity: 1,
            },
        ];
        cards.sort_by(by_collector_number);
        let ids: Vec<&str> = cards.iter().map(|entry| entry.card.id.as_str()).collect();
        assert_eq!(ids, vec!["sv1-2", "sv1-10", "sv2-3"]);
    }
}
