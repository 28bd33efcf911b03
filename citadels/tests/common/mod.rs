pub mod data;

use citadels::{
   Catalog, Character, DecisionSource, DistrictCard, Game, GameConfig, GameView, KeptCard, MagicianAction, Purpose,
   Rank, ResourceChoice, Seat, Snapshot,
};
use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Answers from queues, then falls back to the most passive legal answer.
#[derive(Default)]
pub struct ScriptedSource {
   pub characters: VecDeque<String>,
   pub ranks: VecDeque<Rank>,
   pub players: VecDeque<Option<Seat>>,
   pub districts: VecDeque<Option<usize>>,
   pub discards: VecDeque<Vec<usize>>,
   pub kept: VecDeque<KeptCard>,
   pub resources: VecDeque<ResourceChoice>,
   pub builds: VecDeque<Option<usize>>,
   pub magician: VecDeque<MagicianAction>,
   /// Answer every build prompt with this index forever.
   pub stubborn_build: Option<usize>,
   pub asked: Rc<Cell<usize>>,
}

impl ScriptedSource {
   pub fn new() -> ScriptedSource {
      ScriptedSource::default()
   }

   pub fn ranks(mut self, ranks: &[Rank]) -> ScriptedSource {
      self.ranks.extend(ranks.iter().cloned());
      self
   }

   pub fn players(mut self, players: &[Option<Seat>]) -> ScriptedSource {
      self.players.extend(players.iter().cloned());
      self
   }

   pub fn districts(mut self, districts: &[Option<usize>]) -> ScriptedSource {
      self.districts.extend(districts.iter().cloned());
      self
   }

   pub fn builds(mut self, builds: &[Option<usize>]) -> ScriptedSource {
      self.builds.extend(builds.iter().cloned());
      self
   }

   pub fn magician(mut self, actions: &[MagicianAction]) -> ScriptedSource {
      self.magician.extend(actions.iter().cloned());
      self
   }

   pub fn boxed(self) -> Box<dyn DecisionSource> {
      Box::new(self)
   }

   fn tick(&self) {
      self.asked.set(self.asked.get() + 1);
   }
}

impl DecisionSource for ScriptedSource {
   fn strategy_name(&self) -> &'static str {
      "Scripted"
   }

   fn choose_character(&mut self, _view: &GameView, available: &[Character]) -> String {
      self.tick();
      self
         .characters
         .pop_front()
         .unwrap_or_else(|| available[0].name().to_string())
   }

   fn choose_rank(&mut self, _view: &GameView, min: Rank, _max: Rank, _purpose: Purpose) -> Rank {
      self.tick();
      self.ranks.pop_front().unwrap_or(min)
   }

   fn choose_player(&mut self, _view: &GameView, _candidates: &[Seat], _purpose: Purpose) -> Option<Seat> {
      self.tick();
      self.players.pop_front().unwrap_or(None)
   }

   fn choose_district_index(&mut self, _view: &GameView, _target: Seat, _city: &[DistrictCard]) -> Option<usize> {
      self.tick();
      self.districts.pop_front().unwrap_or(None)
   }

   fn choose_discard_indices(&mut self, _view: &GameView, _hand: &[DistrictCard]) -> Vec<usize> {
      self.tick();
      self.discards.pop_front().unwrap_or_default()
   }

   fn choose_kept_card(&mut self, _view: &GameView, _first: &DistrictCard, _second: &DistrictCard) -> KeptCard {
      self.tick();
      self.kept.pop_front().unwrap_or(KeptCard::First)
   }

   fn choose_resource(&mut self, _view: &GameView) -> ResourceChoice {
      self.tick();
      self.resources.pop_front().unwrap_or(ResourceChoice::Gold)
   }

   fn choose_build(&mut self, _view: &GameView) -> Option<usize> {
      self.tick();
      if self.stubborn_build.is_some() {
         return self.stubborn_build;
      }
      self.builds.pop_front().unwrap_or(None)
   }

   fn choose_magician_action(&mut self, _view: &GameView) -> MagicianAction {
      self.tick();
      self.magician.pop_front().unwrap_or(MagicianAction::Pass)
   }
}

pub fn passive_sources(count: usize) -> Vec<Box<dyn DecisionSource>> {
   (0..count).map(|_| ScriptedSource::new().boxed()).collect()
}

pub fn catalog() -> Catalog {
   Catalog::classic().unwrap()
}

pub fn new_game(players: usize, seed: u64, sources: Vec<Box<dyn DecisionSource>>) -> Game {
   Game::new(GameConfig::with_players(players).seeded(seed), catalog(), sources).unwrap()
}

/// A fresh seeded table, captured as a snapshot for tests to edit before restoring.
pub fn base_snapshot(players: usize, seed: u64) -> Snapshot {
   new_game(players, seed, passive_sources(players)).snapshot()
}

pub fn restore(snapshot: &Snapshot, sources: Vec<Box<dyn DecisionSource>>) -> Game {
   Game::restore(snapshot, GameConfig::with_players(snapshot.players.len()), catalog(), sources).unwrap()
}

/// Every seat's gold, used to compare tables.
pub fn purses(game: &Game) -> Vec<u32> {
   game.players().iter().map(|p| p.gold).collect()
}
