//! Core data models for the Pokedex CLI
//!
//! This module contains the records decoded from PokeAPI responses, plus the
//! fetcher and client used to retrieve them.

pub mod client;
pub mod fetch;

pub use client::{ApiError, PokeApiClient, DEFAULT_PAGE_SIZE, POKEAPI_BASE_URL};
pub use fetch::{CachedFetcher, FetchError};

use serde::{Deserialize, Deserializer, Serialize};

/// A name/URL pair, the way PokeAPI links to other resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}

/// One page of the location-area catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationAreaPage {
    /// Total number of location areas
    pub count: u32,
    /// URL of the next page, absent on the last page
    pub next: Option<String>,
    /// URL of the previous page, absent on the first page
    pub previous: Option<String>,
    /// Location areas on this page
    pub results: Vec<NamedResource>,
}

/// Encounter data for a single location area
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationAreaDetail {
    #[serde(default)]
    pub name: String,
    pub pokemon_encounters: Vec<PokemonEncounter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokemonEncounter {
    pub pokemon: NamedResource,
}

/// A pokemon's detail record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pokemon {
    pub id: u32,
    pub name: String,
    /// Experience gained for defeating this pokemon; drives catch difficulty
    #[serde(default, deserialize_with = "null_as_zero")]
    pub base_experience: u32,
    /// Height in decimetres
    pub height: u32,
    /// Weight in hectograms
    pub weight: u32,
    #[serde(default)]
    pub stats: Vec<PokemonStat>,
    #[serde(default)]
    pub types: Vec<PokemonType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokemonStat {
    pub base_stat: u32,
    pub stat: NamedResource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokemonType {
    pub slot: u8,
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(0))
}

impl Pokemon {
    /// Stat names paired with their base values, in API order
    pub fn stat_values(&self) -> Vec<(&str, u32)> {
        self.stats
            .iter()
            .map(|s| (s.stat.name.as_str(), s.base_stat))
            .collect()
    }

    /// Type names in slot order
    pub fn type_names(&self) -> Vec<String> {
        let mut types: Vec<_> = self.types.iter().collect();
        types.sort_by_key(|t| t.slot);
        types.into_iter().map(|t| t.kind.name.clone()).collect()
    }
}
