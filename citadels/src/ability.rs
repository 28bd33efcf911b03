//! Character abilities, dispatched by rank through a static table.
//!
//! Every handler only touches the table through `Game`'s mutators. A refused choice
//! is narrated and dropped so the turn carries on.
use crate::ai::{MagicianAction, Purpose};
use crate::card::{Character, Seat};
use crate::game::{Game, ARCHITECT_BUILD_LIMIT, ARCHITECT_EXTRA_CARDS};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Timing {
   /// Before the resource phase.
   Start,
   BeforeBuild,
   AfterBuild,
}

type Handler = fn(&mut Game, Seat);

struct Ability {
   start: Option<Handler>,
   before_build: Option<Handler>,
   after_build: Option<Handler>,
}

// Indexed by rank - 1.
const ABILITIES: [Ability; 8] = [
   Ability {
      start: Some(assassin),
      before_build: None,
      after_build: None,
   },
   Ability {
      start: Some(thief),
      before_build: None,
      after_build: None,
   },
   Ability {
      start: None,
      before_build: None,
      after_build: Some(magician),
   },
   Ability {
      start: Some(king),
      before_build: None,
      after_build: None,
   },
   Ability {
      start: Some(bishop),
      before_build: None,
      after_build: None,
   },
   Ability {
      start: Some(merchant),
      before_build: None,
      after_build: None,
   },
   Ability {
      start: None,
      before_build: Some(architect),
      after_build: None,
   },
   Ability {
      start: Some(warlord_income),
      before_build: None,
      after_build: Some(warlord_destroy),
   },
];

pub fn resolve(game: &mut Game, seat: Seat, character: Character, timing: Timing) {
   let ability = &ABILITIES[(character.rank() - 1) as usize];
   let handler = match timing {
      Timing::Start => ability.start,
      Timing::BeforeBuild => ability.before_build,
      Timing::AfterBuild => ability.after_build,
   };
   if let Some(handler) = handler {
      trace!("Resolving {} ({:?}) for seat {}", character, timing, seat);
      handler(game, seat);
   }
}

fn assassin(game: &mut Game, seat: Seat) {
   let rank = game.request_rank(seat, 2, 8, Purpose::Kill);
   if let Err(refusal) = game.kill_rank(seat, rank) {
      game.refuse(seat, refusal);
   }
}

fn thief(game: &mut Game, seat: Seat) {
   let rank = game.request_rank(seat, 3, 8, Purpose::Rob);
   if let Err(refusal) = game.set_rob_target(seat, rank) {
      game.refuse(seat, refusal);
   }
}

fn magician(game: &mut Game, seat: Seat) {
   match game.request_magician_action(seat) {
      MagicianAction::Swap => {
         let candidates: Vec<Seat> = game.players().iter().map(|p| p.id).filter(|id| *id != seat).collect();
         if let Some(with) = game.request_player(seat, &candidates, Purpose::MagicianSwap) {
            if let Err(refusal) = game.swap_hands(seat, with) {
               game.refuse(seat, refusal);
            }
         }
      }
      MagicianAction::Redraw => {
         let indices = game.request_discard_indices(seat);
         if indices.is_empty() {
            return;
         }
         if let Err(refusal) = game.discard_and_redraw(seat, &indices) {
            game.refuse(seat, refusal);
         }
      }
      MagicianAction::Pass => (),
   }
}

fn district_income(game: &mut Game, seat: Seat, character: Character, bonus: u32) {
   if let Some(color) = character.income_color() {
      game.gain_income(seat, color, bonus);
   }
}

fn king(game: &mut Game, seat: Seat) {
   district_income(game, seat, Character::King, 0);
   game.take_crown(seat);
}

fn bishop(game: &mut Game, seat: Seat) {
   district_income(game, seat, Character::Bishop, 0);
   game.set_bishop_protection(seat, true);
}

fn merchant(game: &mut Game, seat: Seat) {
   district_income(game, seat, Character::Merchant, 1);
}

fn architect(game: &mut Game, seat: Seat) {
   game.draw_cards(seat, ARCHITECT_EXTRA_CARDS);
   game.set_build_limit(seat, ARCHITECT_BUILD_LIMIT);
}

fn warlord_income(game: &mut Game, seat: Seat) {
   district_income(game, seat, Character::Warlord, 0);
}

fn warlord_destroy(game: &mut Game, seat: Seat) {
   let candidates: Vec<Seat> = game.players().iter().filter(|p| !p.city.is_empty()).map(|p| p.id).collect();
   if candidates.is_empty() {
      return;
   }
   let victim = match game.request_player(seat, &candidates, Purpose::WarlordDestroy) {
      Some(victim) => victim,
      None => return,
   };
   if let Some(index) = game.request_district_index(seat, victim) {
      // Refusals are narrated by destroy_district itself.
      let _ = game.destroy_district(seat, victim, index);
   }
}

#[cfg(test)]
mod test {
   use super::*;
   use crate::card::{DistrictColor, BISHOP_RANK};
   use crate::data::GameEvent;
   use crate::game::test::{ai_game, district};

   #[test]
   fn every_rank_has_an_entry() {
      for c in crate::card::CHARACTERS.iter() {
         let a = &ABILITIES[(c.rank() - 1) as usize];
         assert!(a.start.is_some() || a.before_build.is_some() || a.after_build.is_some());
      }
   }

   #[test]
   fn merchant_earns_green_plus_one() {
      let mut game = ai_game(4, 21);
      game.start_test_turn(0, Character::Merchant);
      game.player_mut(0).city = vec![
         district("Tavern", DistrictColor::Green, 1),
         district("Market", DistrictColor::Green, 2),
      ];
      resolve(&mut game, 0, Character::Merchant, Timing::Start);
      assert_eq!(game.players()[0].gold, 2 + 3);
   }

   #[test]
   fn king_takes_the_crown_and_yellow_income() {
      let mut game = ai_game(4, 22);
      game.start_test_turn(2, Character::King);
      game.player_mut(2).city = vec![district("Manor", DistrictColor::Yellow, 3)];
      resolve(&mut game, 2, Character::King, Timing::Start);
      assert_eq!(game.crowned_seat(), 2);
      assert_eq!(game.players()[2].gold, 3);
      assert!(game.events().contains(&GameEvent::CrownTaken { seat: 2 }));
   }

   #[test]
   fn bishop_protects_own_city() {
      let mut game = ai_game(4, 23);
      game.start_test_turn(1, Character::Bishop);
      resolve(&mut game, 1, Character::Bishop, Timing::Start);
      assert!(game.is_protected(1));
   }

   #[test]
   fn killing_the_bishop_lifts_protection() {
      let mut game = ai_game(4, 24);
      game.start_test_turn(3, Character::Bishop);
      game.set_bishop_protection(3, true);
      game.kill_rank(0, BISHOP_RANK).unwrap();
      assert!(!game.is_protected(3));
      assert!(game.killed_ranks().contains(&BISHOP_RANK));
   }

   #[test]
   fn architect_draws_two_and_builds_three() {
      let mut game = ai_game(4, 25);
      game.start_test_turn(1, Character::Architect);
      let before = game.players()[1].hand.len();
      resolve(&mut game, 1, Character::Architect, Timing::BeforeBuild);
      assert_eq!(game.players()[1].hand.len(), before + 2);
      assert_eq!(game.builds_left(1), ARCHITECT_BUILD_LIMIT);
   }

   #[test]
   fn assassin_and_thief_mark_ranks() {
      let mut game = ai_game(4, 26);
      game.start_test_turn(0, Character::Assassin);
      game.start_test_turn(1, Character::Thief);
      resolve(&mut game, 0, Character::Assassin, Timing::Start);
      resolve(&mut game, 1, Character::Thief, Timing::Start);
      assert_eq!(game.killed_ranks().len(), 1);
      let killed = *game.killed_ranks().iter().next().unwrap();
      assert!(killed >= 2 && killed <= 8);
      let robbery = game.robbery().unwrap();
      assert_eq!(robbery.thief, 1);
      assert!(robbery.rank >= 3 && robbery.rank <= 8);
   }

   #[test]
   fn warlord_razes_cheapest_open_district() {
      let mut game = ai_game(4, 27);
      game.start_test_turn(3, Character::Warlord);
      game.player_mut(3).gold = 1;
      game.player_mut(0).city = vec![district("Castle", DistrictColor::Yellow, 4)];
      game.player_mut(1).city = vec![
         district("Manor", DistrictColor::Yellow, 3),
         district("Temple", DistrictColor::Blue, 1),
      ];
      resolve(&mut game, 3, Character::Warlord, Timing::AfterBuild);
      assert_eq!(game.players()[1].city, vec![district("Manor", DistrictColor::Yellow, 3)]);
      assert_eq!(game.players()[0].city.len(), 1);
      assert_eq!(game.players()[3].gold, 1);
      let destroyed = game.events().iter().any(|e| match e {
         GameEvent::Destroyed { victim: 1, paid: 0, .. } => true,
         _ => false,
      });
      assert!(destroyed);
      assert_eq!(game.supply().iter().last().map(|d| d.name()), Some("Temple"));
   }
}
