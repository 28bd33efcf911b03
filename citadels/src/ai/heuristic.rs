// This AI follows fixed rules of thumb: take the richest character, build the priciest district
use super::{DecisionSource, GameView, KeptCard, MagicianAction, Purpose, ResourceChoice};
use crate::card::{Character, DistrictCard, DistrictColor, Rank, Seat};
use crate::player::Player;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering;

/// Cards worth redrawing cost more than this above what we hold.
const REDRAW_COST_MARGIN: u32 = 4;
const SWAP_HAND_MARGIN: usize = 2;
const BISHOP_CITY_THRESHOLD: usize = 5;

pub struct HeuristicAi {
   rng: StdRng,
}

pub fn new(seed: u64) -> HeuristicAi {
   HeuristicAi {
      rng: StdRng::seed_from_u64(seed),
   }
}

fn income_for(view: &GameView, color: DistrictColor) -> i32 {
   view.me().color_count(color, view.rules.wildcard_counts_for_income) as i32
}

/// Nothing built yet gives every character the same score, so the pick falls to pool order.
fn character_score(view: &GameView, character: Character) -> i32 {
   let me = view.me();
   if me.city.is_empty() {
      return 0;
   }
   let income = character.income_color().map_or(0, |color| income_for(view, color));
   match character {
      Character::Assassin | Character::Thief => 1,
      Character::Magician => {
         let most = view.others().map(|p| p.hand.len()).max().unwrap_or(0);
         if me.hand.is_empty() || most >= me.hand.len() + SWAP_HAND_MARGIN {
            2
         } else {
            0
         }
      }
      Character::King | Character::Merchant => income + 1,
      Character::Bishop => {
         let bonus = if me.city.len() >= BISHOP_CITY_THRESHOLD { 1 } else { 0 };
         income + bonus
      }
      Character::Architect => {
         if me.hand.len() >= 2 {
            2
         } else {
            1
         }
      }
      Character::Warlord => income,
   }
}

/// Other computer seats richest first, then everyone else.
fn target_order<'a>(view: &GameView<'a>) -> Vec<&'a Player> {
   let mut others: Vec<&Player> = view.others().collect();
   others.sort_by(|a, b| match (view.is_computer(a.id), view.is_computer(b.id)) {
      (true, false) => Ordering::Less,
      (false, true) => Ordering::Greater,
      _ => b.gold.cmp(&a.gold),
   });
   others
}

fn can_be_razed(view: &GameView, target: &Player) -> bool {
   target.id != view.me && !view.is_complete(target) && !view.protected.contains(&target.id)
}

/// Cheapest district whose demolition we can pay for.
fn cheapest_affordable(city: &[DistrictCard], gold: u32) -> Option<(usize, u32)> {
   city
      .iter()
      .enumerate()
      .map(|(i, d)| (i, d.cost().saturating_sub(1)))
      .filter(|(_, price)| *price <= gold)
      .min_by_key(|(_, price)| *price)
}

fn redraw_candidates(me: &Player) -> Vec<usize> {
   me.hand
      .iter()
      .enumerate()
      .filter(|(_, d)| me.city_contains(d.name()) || d.cost() > me.gold + REDRAW_COST_MARGIN)
      .map(|(i, _)| i)
      .collect()
}

fn richest_hand<'a>(view: &GameView<'a>, candidates: &[Seat]) -> Option<&'a Player> {
   let mut best: Option<&Player> = None;
   for p in view.players.iter().filter(|p| p.id != view.me && candidates.contains(&p.id)) {
      if best.map_or(true, |b| p.hand.len() > b.hand.len()) {
         best = Some(p);
      }
   }
   best
}

impl DecisionSource for HeuristicAi {
   fn strategy_name(&self) -> &'static str {
      "Heuristic"
   }

   fn choose_character(&mut self, view: &GameView, available: &[Character]) -> String {
      let mut best: Option<(Character, i32)> = None;
      for c in available.iter().cloned() {
         let score = character_score(view, c);
         if best.map_or(true, |(_, s)| score > s) {
            best = Some((c, score));
         }
      }
      best.map(|(c, _)| c.name().to_string()).unwrap_or_default()
   }

   fn choose_rank(&mut self, view: &GameView, min: Rank, max: Rank, purpose: Purpose) -> Rank {
      for target in target_order(view) {
         if let Some(rank) = target.rank() {
            if rank < min || rank > max {
               continue;
            }
            if purpose == Purpose::Rob && view.killed.contains(&rank) {
               continue;
            }
            return rank;
         }
      }

      let open: Vec<Rank> = (min..=max)
         .filter(|r| purpose != Purpose::Rob || !view.killed.contains(r))
         .filter(|r| Some(*r) != view.me().rank())
         .collect();
      if open.is_empty() {
         self.rng.gen_range(min..=max)
      } else {
         open[self.rng.gen_range(0..open.len())]
      }
   }

   fn choose_player(&mut self, view: &GameView, candidates: &[Seat], purpose: Purpose) -> Option<Seat> {
      match purpose {
         Purpose::MagicianSwap => {
            richest_hand(view, candidates)
               .filter(|p| p.hand.len() >= view.me().hand.len() + SWAP_HAND_MARGIN)
               .map(|p| p.id)
         }
         Purpose::WarlordDestroy => {
            let gold = view.me().gold;
            view
               .players
               .iter()
               .filter(|p| candidates.contains(&p.id) && can_be_razed(view, p))
               .filter_map(|p| cheapest_affordable(&p.city, gold).map(|(_, price)| (p.id, price)))
               .min_by_key(|(_, price)| *price)
               .map(|(seat, _)| seat)
         }
         Purpose::Kill | Purpose::Rob => candidates.first().cloned(),
      }
   }

   fn choose_district_index(&mut self, view: &GameView, _target: Seat, city: &[DistrictCard]) -> Option<usize> {
      cheapest_affordable(city, view.me().gold).map(|(i, _)| i)
   }

   fn choose_discard_indices(&mut self, view: &GameView, _hand: &[DistrictCard]) -> Vec<usize> {
      redraw_candidates(view.me())
   }

   fn choose_kept_card(&mut self, _view: &GameView, first: &DistrictCard, second: &DistrictCard) -> KeptCard {
      if first.cost() >= second.cost() {
         KeptCard::First
      } else {
         KeptCard::Second
      }
   }

   fn choose_resource(&mut self, view: &GameView) -> ResourceChoice {
      let me = view.me();
      if me.hand.is_empty() {
         if view.supply_len == 0 {
            return ResourceChoice::Gold;
         }
         return ResourceChoice::Cards;
      }
      let can_afford = me.buildable().next().is_some();
      if me.gold < 2 || can_afford {
         ResourceChoice::Gold
      } else {
         ResourceChoice::Cards
      }
   }

   fn choose_build(&mut self, view: &GameView) -> Option<usize> {
      let mut best: Option<(usize, &DistrictCard)> = None;
      for (i, d) in view.me().buildable() {
         let better = match best {
            None => true,
            Some((_, b)) => (d.cost(), d.color() == DistrictColor::Purple) > (b.cost(), b.color() == DistrictColor::Purple),
         };
         if better {
            best = Some((i, d));
         }
      }
      best.map(|(i, _)| i)
   }

   fn choose_magician_action(&mut self, view: &GameView) -> MagicianAction {
      let me = view.me();
      let others: Vec<Seat> = view.others().map(|p| p.id).collect();
      if richest_hand(view, &others).map_or(false, |p| p.hand.len() >= me.hand.len() + SWAP_HAND_MARGIN) {
         MagicianAction::Swap
      } else if !redraw_candidates(me).is_empty() {
         MagicianAction::Redraw
      } else {
         MagicianAction::Pass
      }
   }
}

mod test {
   #[cfg(test)]
   use super::*;
   #[cfg(test)]
   use crate::config::RuleConfig;
   #[cfg(test)]
   use std::collections::BTreeSet;

   #[cfg(test)]
   fn district(name: &str, color: DistrictColor, cost: u32) -> DistrictCard {
      DistrictCard::new(name, color, cost, None)
   }

   #[cfg(test)]
   fn table() -> Vec<Player> {
      (0..4).map(|i| Player::new(i, 2)).collect()
   }

   #[cfg(test)]
   fn with_view<T>(players: &[Player], protected: &BTreeSet<Seat>, f: impl FnOnce(&GameView) -> T) -> T {
      let computer = vec![true; players.len()];
      let killed = BTreeSet::new();
      let rules = RuleConfig::default();
      let view = GameView {
         round: 1,
         me: 0,
         crowned: 0,
         players,
         computer: &computer,
         killed: &killed,
         protected,
         supply_len: 40,
         rules: &rules,
      };
      f(&view)
   }

   #[test]
   fn builds_the_most_expensive_affordable_district() {
      let mut players = table();
      players[0].gold = 4;
      players[0].hand = vec![
         district("Tavern", DistrictColor::Green, 1),
         district("Castle", DistrictColor::Yellow, 4),
         district("Palace", DistrictColor::Yellow, 5),
      ];
      let mut ai = new(0);
      let choice = with_view(&players, &BTreeSet::new(), |v| ai.choose_build(v));
      assert_eq!(choice, Some(1));
   }

   #[test]
   fn skips_districts_already_built() {
      let mut players = table();
      players[0].gold = 6;
      players[0].city = vec![district("Castle", DistrictColor::Yellow, 4)];
      players[0].hand = vec![district("Castle", DistrictColor::Yellow, 4), district("Tavern", DistrictColor::Green, 1)];
      let mut ai = new(0);
      let choice = with_view(&players, &BTreeSet::new(), |v| ai.choose_build(v));
      assert_eq!(choice, Some(1));
   }

   #[test]
   fn resource_choice_follows_hand_and_purse() {
      let mut ai = new(1);
      let mut players = table();
      players[0].hand.clear();
      assert_eq!(
         with_view(&players, &BTreeSet::new(), |v| ai.choose_resource(v)),
         ResourceChoice::Cards
      );

      players[0].gold = 1;
      players[0].hand = vec![district("Palace", DistrictColor::Yellow, 5)];
      assert_eq!(
         with_view(&players, &BTreeSet::new(), |v| ai.choose_resource(v)),
         ResourceChoice::Gold
      );

      players[0].gold = 3;
      assert_eq!(
         with_view(&players, &BTreeSet::new(), |v| ai.choose_resource(v)),
         ResourceChoice::Cards
      );
   }

   #[test]
   fn keeps_the_pricier_card() {
      let mut ai = new(2);
      let players = table();
      let cheap = district("Tavern", DistrictColor::Green, 1);
      let dear = district("Fortress", DistrictColor::Red, 5);
      assert_eq!(
         with_view(&players, &BTreeSet::new(), |v| ai.choose_kept_card(v, &cheap, &dear)),
         KeptCard::Second
      );
      assert_eq!(
         with_view(&players, &BTreeSet::new(), |v| ai.choose_kept_card(v, &dear, &dear)),
         KeptCard::First
      );
   }

   #[test]
   fn prefers_character_with_most_income() {
      let mut players = table();
      players[0].city = vec![
         district("Manor", DistrictColor::Yellow, 3),
         district("Castle", DistrictColor::Yellow, 4),
         district("Tavern", DistrictColor::Green, 1),
      ];
      players[0].hand = vec![district("Temple", DistrictColor::Blue, 1)];
      let mut ai = new(3);
      let pool = [Character::Thief, Character::King, Character::Merchant, Character::Warlord];
      let choice = with_view(&players, &BTreeSet::new(), |v| ai.choose_character(v, &pool));
      assert_eq!(choice, "King");
   }

   #[test]
   fn empty_city_takes_the_first_remaining_character() {
      let mut players = table();
      players[0].hand = vec![
         district("Manor", DistrictColor::Yellow, 3),
         district("Castle", DistrictColor::Yellow, 4),
         district("Temple", DistrictColor::Blue, 1),
         district("Tavern", DistrictColor::Green, 1),
      ];
      let mut ai = new(7);
      let pool = [Character::Assassin, Character::King, Character::Architect];
      let choice = with_view(&players, &BTreeSet::new(), |v| ai.choose_character(v, &pool));
      assert_eq!(choice, "Assassin");

      let pool = [Character::Warlord, Character::Magician, Character::Merchant];
      let choice = with_view(&players, &BTreeSet::new(), |v| ai.choose_character(v, &pool));
      assert_eq!(choice, "Warlord");
   }

   #[test]
   fn targets_the_richest_known_rank_in_range() {
      let mut players = table();
      players[1].gold = 3;
      players[1].assign_character(Character::Bishop);
      players[2].gold = 9;
      players[2].assign_character(Character::Merchant);
      players[3].gold = 1;
      players[3].assign_character(Character::Warlord);
      let mut ai = new(4);
      let rank = with_view(&players, &BTreeSet::new(), |v| ai.choose_rank(v, 3, 8, Purpose::Rob));
      assert_eq!(rank, 6);
   }

   #[test]
   fn warlord_skips_protected_and_unaffordable_cities() {
      let mut players = table();
      players[0].gold = 2;
      players[1].city = vec![district("Watchtower", DistrictColor::Red, 1)];
      players[2].city = vec![district("Fortress", DistrictColor::Red, 5)];
      players[3].city = vec![district("Manor", DistrictColor::Yellow, 3)];
      let mut protected = BTreeSet::new();
      protected.insert(1);
      let mut ai = new(5);
      let seat = with_view(&players, &protected, |v| ai.choose_player(v, &[1, 2, 3], Purpose::WarlordDestroy));
      assert_eq!(seat, Some(3));
      let index = with_view(&players, &protected, |v| ai.choose_district_index(v, 3, &players[3].city));
      assert_eq!(index, Some(0));
   }

   #[test]
   fn magician_swaps_with_a_much_bigger_hand() {
      let mut players = table();
      players[0].hand = vec![district("Tavern", DistrictColor::Green, 1)];
      players[2].hand = vec![
         district("Temple", DistrictColor::Blue, 1),
         district("Church", DistrictColor::Blue, 2),
         district("Market", DistrictColor::Green, 2),
      ];
      let mut ai = new(6);
      assert_eq!(
         with_view(&players, &BTreeSet::new(), |v| ai.choose_magician_action(v)),
         MagicianAction::Swap
      );
      assert_eq!(
         with_view(&players, &BTreeSet::new(), |v| ai.choose_player(v, &[1, 2, 3], Purpose::MagicianSwap)),
         Some(2)
      );

      players[2].hand.truncate(1);
      players[0].city = vec![district("Tavern", DistrictColor::Green, 1)];
      assert_eq!(
         with_view(&players, &BTreeSet::new(), |v| ai.choose_magician_action(v)),
         MagicianAction::Redraw
      );
      assert_eq!(
         with_view(&players, &BTreeSet::new(), |v| ai.choose_discard_indices(v, &players[0].hand)),
         vec![0]
      );
   }
}
