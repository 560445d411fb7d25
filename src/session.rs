//! Session state for a REPL run
//!
//! The session is owned by the REPL loop and lent mutably to each command
//! handler. It carries the pagination cursors, the caught collection, and the
//! API client.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

use crate::data::{PokeApiClient, Pokemon};

/// Highest base experience used by the catch formula
const MAX_BASE_EXPERIENCE: u32 = 600;

/// Mutable state shared by command handlers
pub struct Session {
    /// API client used by the network-backed commands
    pub client: PokeApiClient,
    /// URL of the next location-area page, if known
    pub next: Option<String>,
    /// URL of the previous location-area page, if any
    pub previous: Option<String>,
    /// Caught pokemon keyed by name
    pub pokedex: BTreeMap<String, Pokemon>,
    /// Flag indicating the REPL should stop
    pub should_quit: bool,
    rng: StdRng,
}

impl Session {
    /// Creates a session with an entropy-seeded RNG
    pub fn new(client: PokeApiClient) -> Self {
        Self::with_rng(client, StdRng::from_entropy())
    }

    /// Creates a session whose catch rolls are reproducible
    pub fn with_seed(client: PokeApiClient, seed: u64) -> Self {
        Self::with_rng(client, StdRng::seed_from_u64(seed))
    }

    fn with_rng(client: PokeApiClient, rng: StdRng) -> Self {
        Self {
            client,
            next: None,
            previous: None,
            pokedex: BTreeMap::new(),
            should_quit: false,
            rng,
        }
    }

    /// Rolls for a catch and records the pokemon on success
    ///
    /// Returns whether the pokemon was caught.
    pub fn try_catch(&mut self, pokemon: Pokemon) -> bool {
        let roll = self.rng.gen_range(0..100);
        if catch_succeeds(pokemon.base_experience, roll) {
            self.pokedex.insert(pokemon.name.clone(), pokemon);
            true
        } else {
            false
        }
    }
}

/// Minimum roll (out of 100) needed to catch a pokemon
///
/// Higher base experience lowers the threshold. Values above 600 are clamped,
/// so the strongest pokemon are always caught.
pub fn catch_threshold(base_experience: u32) -> u32 {
    let exp = base_experience.min(MAX_BASE_EXPERIENCE);
    (MAX_BASE_EXPERIENCE - exp) * 100 / MAX_BASE_EXPERIENCE
}

/// Whether `roll` in `0..100` catches a pokemon with the given base experience
pub fn catch_succeeds(base_experience: u32, roll: u32) -> bool {
    roll >= catch_threshold(base_experience)
}
