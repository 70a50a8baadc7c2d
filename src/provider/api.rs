use async_trait::async_trait;
use reqwest::Client;
use serde::{
    de::DeserializeOwned,
    Deserialize,
};
use tracing::debug;

use super::CreatureProvider;
use crate::core::{
    http::{
        ensure_success,
        join_url,
    },
    models::Description,
    HydratedRecord,
    IndexEntry,
    PokedexError,
    Result,
    SpeciesData,
    Stat,
};

#[derive(Debug, Deserialize)]
struct NamedResource {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Sprites {
    front_default: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TypeSlot {
    #[serde(rename = "type")]
    kind: NamedResource,
}

#[derive(Debug, Deserialize)]
struct StatSlot {
    base_stat: u32,
    stat: NamedResource,
}

#[derive(Debug, Deserialize)]
struct PokemonResponse {
    id: u32,
    name: String,
    sprites: Sprites,
    types: Vec<TypeSlot>,
    stats: Vec<StatSlot>,
}

#[derive(Debug, Deserialize)]
struct FlavorTextEntry {
    flavor_text: String,
    language: NamedResource,
}

#[derive(Debug, Deserialize)]
struct SpeciesResponse {
    evolves_from_species: Option<NamedResource>,
    #[serde(default)]
    flavor_text_entries: Vec<FlavorTextEntry>,
}

#[derive(Debug, Deserialize)]
struct IndexItem {
    name: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct IndexResponse {
    results: Vec<IndexItem>,
}

impl From<SpeciesResponse> for SpeciesData {
    fn from(species: SpeciesResponse) -> Self {
        SpeciesData {
            evolves_from: species.evolves_from_species.map(|s| s.name),
            descriptions: species
                .flavor_text_entries
                .into_iter()
                .map(|e| Description { text: e.flavor_text, language: e.language.name })
                .collect(),
        }
    }
}

fn hydrate(pokemon: PokemonResponse, species: Option<SpeciesResponse>) -> Result<HydratedRecord> {
    if pokemon.types.is_empty() {
        return Err(PokedexError::Decode(format!("record {} has no types", pokemon.id)));
    }

    Ok(HydratedRecord {
        id: pokemon.id,
        name: pokemon.name,
        image: pokemon.sprites.front_default,
        types: pokemon.types.into_iter().map(|t| t.kind.name).collect(),
        stats: pokemon
            .stats
            .into_iter()
            .map(|s| Stat { name: s.stat.name, value: s.base_stat.to_string() })
            .collect(),
        species: species.map(SpeciesData::from),
    })
}

fn index_entries(index: IndexResponse) -> Vec<IndexEntry> {
    index.results.iter().filter_map(|item| IndexEntry::from_url(&item.name, &item.url)).collect()
}

/// `CreatureProvider` backed by the PokeAPI REST endpoints.
pub struct PokeApiProvider {
    base_url: String,
    client: Client,
}

impl PokeApiProvider {
    pub fn new(base_url: impl Into<String>, client: Client) -> Self {
        Self { base_url: base_url.into(), client }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, id: Option<u32>) -> Result<T> {
        let url = join_url(&self.base_url, path);
        debug!("GET {}", url);

        let resp = self.client.get(&url).send().await?;
        ensure_success(&resp, id)?;
        Ok(resp.json::<T>().await?)
    }
}

#[async_trait]
impl CreatureProvider for PokeApiProvider {
    async fn fetch_record(&self, id: u32) -> Result<HydratedRecord> {
        let pokemon: PokemonResponse = self.get_json(&format!("pokemon/{id}/"), Some(id)).await?;

        let species =
            match self.get_json::<SpeciesResponse>(&format!("pokemon-species/{id}/"), Some(id)).await
            {
                Ok(species) => Some(species),
                Err(e) if e.is_not_found() => {
                    debug!("No species record for {}", id);
                    None
                }
                Err(e) => return Err(e),
            };

        hydrate(pokemon, species)
    }

    async fn fetch_index(&self, limit: u32) -> Result<Vec<IndexEntry>> {
        let index: IndexResponse = self.get_json(&format!("pokemon?limit={limit}"), None).await?;
        Ok(index_entries(index))
    }
}
