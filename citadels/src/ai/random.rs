// This AI makes random legal choices
use super::{DecisionSource, GameView, KeptCard, MagicianAction, Purpose, ResourceChoice};
use crate::card::{Character, DistrictCard, Rank, Seat};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

pub struct RandomAi {
   rng: StdRng,
}

pub fn new(seed: u64) -> RandomAi {
   RandomAi {
      rng: StdRng::seed_from_u64(seed),
   }
}

impl DecisionSource for RandomAi {
   fn strategy_name(&self) -> &'static str {
      "Random"
   }

   fn choose_character(&mut self, _view: &GameView, available: &[Character]) -> String {
      available
         .choose(&mut self.rng)
         .map(|c| c.name().to_string())
         .unwrap_or_default()
   }

   fn choose_rank(&mut self, _view: &GameView, min: Rank, max: Rank, _purpose: Purpose) -> Rank {
      self.rng.gen_range(min..=max)
   }

   fn choose_player(&mut self, _view: &GameView, candidates: &[Seat], _purpose: Purpose) -> Option<Seat> {
      if self.rng.gen_bool(0.5) {
         candidates.choose(&mut self.rng).cloned()
      } else {
         None
      }
   }

   fn choose_district_index(&mut self, _view: &GameView, _target: Seat, city: &[DistrictCard]) -> Option<usize> {
      if city.is_empty() {
         None
      } else {
         Some(self.rng.gen_range(0..city.len()))
      }
   }

   fn choose_discard_indices(&mut self, _view: &GameView, hand: &[DistrictCard]) -> Vec<usize> {
      (0..hand.len()).filter(|_| self.rng.gen_bool(0.5)).collect()
   }

   fn choose_kept_card(&mut self, _view: &GameView, _first: &DistrictCard, _second: &DistrictCard) -> KeptCard {
      if self.rng.gen_bool(0.5) {
         KeptCard::First
      } else {
         KeptCard::Second
      }
   }

   fn choose_resource(&mut self, _view: &GameView) -> ResourceChoice {
      if self.rng.gen_bool(0.5) {
         ResourceChoice::Gold
      } else {
         ResourceChoice::Cards
      }
   }

   fn choose_build(&mut self, view: &GameView) -> Option<usize> {
      let options: Vec<usize> = view.me().buildable().map(|(i, _)| i).collect();
      options.choose(&mut self.rng).cloned()
   }

   fn choose_magician_action(&mut self, _view: &GameView) -> MagicianAction {
      *[MagicianAction::Swap, MagicianAction::Redraw, MagicianAction::Pass]
         .choose(&mut self.rng)
         .unwrap_or(&MagicianAction::Pass)
   }
}
