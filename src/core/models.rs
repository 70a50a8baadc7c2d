use std::{
    fmt,
    sync::Arc,
};

use serde::{
    Deserialize,
    Serialize,
};

pub const POKEMON_TYPES: [&str; 18] = [
    "normal", "fire", "water", "electric", "grass", "ice", "fighting", "poison", "ground",
    "flying", "psychic", "bug", "rock", "ghost", "dragon", "dark", "steel", "fairy",
];

/// One creature with its base record and species record merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydratedRecord {
    pub id: u32,
    pub name: String,
    pub image: Option<String>,
    pub types: Vec<String>,
    pub stats: Vec<Stat>,
    pub species: Option<SpeciesData>,
}

impl HydratedRecord {
    pub fn has_type(&self, tag: &str) -> bool {
        self.types.iter().any(|t| t == tag)
    }

    pub fn stat(&self, name: &str) -> Option<&str> {
        self.stats.iter().find(|s| s.name == name).map(|s| s.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpeciesData {
    pub evolves_from: Option<String>,
    pub descriptions: Vec<Description>,
}

impl SpeciesData {
    /// First description in `language`, with the form feeds and hard line breaks the
    /// upstream text carries collapsed to single spaces.
    pub fn description(&self, language: &str) -> Option<String> {
        self.descriptions
            .iter()
            .find(|d| d.language == language)
            .map(|d| d.text.split_whitespace().collect::<Vec<_>>().join(" "))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Description {
    pub text: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    Any,
    Type(String),
}

impl TypeFilter {
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            TypeFilter::Any
        } else {
            TypeFilter::Type(trimmed.to_lowercase())
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, TypeFilter::Type(_))
    }

    pub fn matches(&self, record: &HydratedRecord) -> bool {
        match self {
            TypeFilter::Any => true,
            TypeFilter::Type(tag) => record.has_type(tag),
        }
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeFilter::Any => write!(f, "all"),
            TypeFilter::Type(tag) => write!(f, "{tag}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub search: String,
    pub type_filter: TypeFilter,
}

impl PageRequest {
    pub fn new(page: u32, search: &str, type_filter: &str) -> Self {
        Self { page, search: search.to_string(), type_filter: TypeFilter::parse(type_filter) }
    }

    pub fn browse(page: u32) -> Self {
        Self::new(page, "", "")
    }

    /// Lowercased search needle, `None` in browse mode.
    pub fn search_needle(&self) -> Option<String> {
        let trimmed = self.search.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_lowercase())
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PageResult {
    pub records: Vec<Arc<HydratedRecord>>,
    pub total_pages: u32,
}

impl PageResult {
    pub fn ids(&self) -> Vec<u32> {
        self.records.iter().map(|r| r.id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub id: u32,
    pub name: String,
}

impl IndexEntry {
    /// Builds an entry from an index item whose url ends in the numeric id,
    /// e.g. `https://pokeapi.co/api/v2/pokemon/25/`.
    pub fn from_url(name: &str, url: &str) -> Option<Self> {
        let id = url.trim_end_matches('/').rsplit('/').next()?.parse::<u32>().ok()?;
        if id == 0 {
            return None;
        }
        Some(Self { id, name: name.to_string() })
    }
}
