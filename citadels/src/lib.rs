#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
extern crate rand;
#[macro_use]
extern crate serde_derive;
extern crate serde;
extern crate serde_json;
extern crate thiserror;

pub mod ability;
pub mod ai;
pub mod card;
pub mod catalog;
pub mod config;
pub mod data;
pub mod error;
pub mod game;
pub mod player;
pub mod score;

pub use ai::{DecisionSource, GameView, KeptCard, MagicianAction, Purpose, ResourceChoice};
pub use card::{Character, Deck, DistrictCard, DistrictColor, Rank, Seat, Special};
pub use catalog::Catalog;
pub use config::{GameConfig, RuleConfig};
pub use data::{GameEvent, PlayerSnapshot, Snapshot};
pub use error::{CatalogError, Refusal, SetupError, SnapshotError};
pub use game::{Game, Phase};
pub use player::Player;
pub use score::ScoreLine;

/// Builds one computer source per seat, alternating strategies when `mixed` is set.
pub fn computer_sources(count: usize, seed: u64, mixed: bool) -> Vec<Box<dyn DecisionSource>> {
   (0..count)
      .map(|i| {
         let seed = seed.wrapping_add(i as u64);
         if mixed && i % 2 == 1 {
            Box::new(ai::random::new(seed)) as Box<dyn DecisionSource>
         } else {
            Box::new(ai::heuristic::new(seed)) as Box<dyn DecisionSource>
         }
      })
      .collect()
}
