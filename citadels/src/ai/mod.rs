use crate::card::{Character, DistrictCard, Rank, Seat};
use crate::config::RuleConfig;
use crate::data::GameEvent;
use crate::player::Player;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;

pub mod heuristic;
pub mod random;

pub const PLAYER_NAME_LIMIT: usize = 20;

lazy_static! {
   static ref NAMES: Vec<&'static str> = { include_str!("names.txt").lines().filter(|l| !l.is_empty()).collect() };
}

/// Why a rank or player is being asked for, so one source can answer several questions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Purpose {
   Kill,
   Rob,
   MagicianSwap,
   WarlordDestroy,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KeptCard {
   First,
   Second,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResourceChoice {
   Gold,
   Cards,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MagicianAction {
   Swap,
   Redraw,
   Pass,
}

/// Read-only view of the table handed to every decision.
pub struct GameView<'a> {
   pub round: u32,
   /// The seat being asked.
   pub me: Seat,
   pub crowned: Seat,
   pub players: &'a [Player],
   /// `computer[seat]` is true for seats not driven by a person.
   pub computer: &'a [bool],
   pub killed: &'a BTreeSet<Rank>,
   pub protected: &'a BTreeSet<Seat>,
   pub supply_len: usize,
   pub rules: &'a RuleConfig,
}

impl<'a> GameView<'a> {
   pub fn me(&self) -> &'a Player {
      &self.players[self.me as usize]
   }

   pub fn others(&self) -> impl Iterator<Item = &'a Player> {
      let me = self.me;
      self.players.iter().filter(move |p| p.id != me)
   }

   pub fn is_computer(&self, seat: Seat) -> bool {
      self.computer.get(seat as usize).cloned().unwrap_or(false)
   }

   pub fn is_complete(&self, player: &Player) -> bool {
      player.city.len() >= self.rules.completed_city
   }
}

/// How a seat makes its choices. The engine validates every answer and asks again
/// when one is not legal, so implementations never need to fail.
pub trait DecisionSource {
   fn strategy_name(&self) -> &'static str;

   fn is_computer(&self) -> bool {
      true
   }

   /// Name of one of `available`.
   fn choose_character(&mut self, view: &GameView, available: &[Character]) -> String;

   fn choose_rank(&mut self, view: &GameView, min: Rank, max: Rank, purpose: Purpose) -> Rank;

   /// `None` declines the optional action.
   fn choose_player(&mut self, view: &GameView, candidates: &[Seat], purpose: Purpose) -> Option<Seat>;

   fn choose_district_index(&mut self, view: &GameView, target: Seat, city: &[DistrictCard]) -> Option<usize>;

   fn choose_discard_indices(&mut self, view: &GameView, hand: &[DistrictCard]) -> Vec<usize>;

   fn choose_kept_card(&mut self, view: &GameView, first: &DistrictCard, second: &DistrictCard) -> KeptCard;

   fn choose_resource(&mut self, view: &GameView) -> ResourceChoice;

   /// Hand index to build next, `None` to stop building.
   fn choose_build(&mut self, view: &GameView) -> Option<usize>;

   fn choose_magician_action(&mut self, view: &GameView) -> MagicianAction;

   fn on_event(&mut self, _event: &GameEvent) {}
}

pub fn bot_name<R: Rng + ?Sized>(rng: &mut R) -> String {
   let mut name = format!("BOT {}", NAMES.choose(rng).cloned().unwrap_or("Anon"));
   name.truncate(PLAYER_NAME_LIMIT);

   name
}

/// Distinct bot names, one per computer seat.
pub fn bot_names<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<String> {
   let mut pool: Vec<&str> = NAMES.clone();
   pool.shuffle(rng);
   let mut names: Vec<String> = pool.iter().take(count).map(|n| format!("BOT {}", n)).collect();
   while names.len() < count {
      names.push(bot_name(rng));
   }
   for name in names.iter_mut() {
      name.truncate(PLAYER_NAME_LIMIT);
   }
   names
}

mod test {
   #[cfg(test)]
   use super::*;
   #[cfg(test)]
   use rand::rngs::StdRng;
   #[cfg(test)]
   use rand::SeedableRng;

   #[test]
   fn bot_names_are_distinct_and_prefixed() {
      let mut rng = StdRng::seed_from_u64(3);
      let names = bot_names(6, &mut rng);
      assert_eq!(names.len(), 6);
      let mut deduped = names.clone();
      deduped.sort();
      deduped.dedup();
      assert_eq!(deduped.len(), 6);
      assert!(names.iter().all(|n| n.starts_with("BOT ") && n.len() <= PLAYER_NAME_LIMIT));
   }
}
