use serde::{
    Deserialize,
    Serialize,
};

use crate::core::{
    models::Description,
    HydratedRecord,
    SpeciesData,
    Stat,
};

pub mod api;

pub use api::CustomStoreClient;

/// First id the custom store hands out; everything below belongs to the provider.
pub const CUSTOM_ID_BASE: u32 = 1001;

pub fn is_custom_id(id: u32) -> bool {
    id >= CUSTOM_ID_BASE
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomStats {
    pub hp: String,
    pub attack: String,
    pub defense: String,
    pub special_attack: String,
    pub special_defense: String,
    pub speed: String,
}

impl CustomStats {
    /// Every stat set to the same value, which is what a new entry starts from.
    pub fn uniform(value: &str) -> Self {
        Self {
            hp: value.to_string(),
            attack: value.to_string(),
            defense: value.to_string(),
            special_attack: value.to_string(),
            special_defense: value.to_string(),
            speed: value.to_string(),
        }
    }

    fn into_stats(self) -> Vec<Stat> {
        [
            ("hp", self.hp),
            ("attack", self.attack),
            ("defense", self.defense),
            ("special-attack", self.special_attack),
            ("special-defense", self.special_defense),
            ("speed", self.speed),
        ]
        .into_iter()
        .map(|(name, value)| Stat { name: name.to_string(), value })
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomRecord {
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub stats: CustomStats,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub evolves_from: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomRecord {
    pub id: u32,
    #[serde(flatten)]
    pub fields: NewCustomRecord,
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

impl From<CustomRecord> for HydratedRecord {
    fn from(record: CustomRecord) -> Self {
        let fields = record.fields;
        let evolves_from = non_empty(fields.evolves_from);
        let description = non_empty(fields.description);

        let species = if evolves_from.is_none() && description.is_none() {
            None
        } else {
            Some(SpeciesData {
                evolves_from,
                descriptions: description
                    .map(|text| Description { text, language: "en".to_string() })
                    .into_iter()
                    .collect(),
            })
        };

        HydratedRecord {
            id: record.id,
            name: fields.name,
            image: non_empty(fields.image_url),
            types: vec![fields.kind],
            stats: fields.stats.into_stats(),
            species,
        }
    }
}
