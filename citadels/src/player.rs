use crate::card::{Character, DistrictCard, DistrictColor, Seat};
use crate::error::Refusal;

pub const DEFAULT_BUILD_LIMIT: u8 = 1;

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
   pub id: Seat,
   pub gold: u32,
   pub hand: Vec<DistrictCard>,
   pub city: Vec<DistrictCard>,
   pub character: Option<Character>,
   pub build_limit: u8,
}

impl Player {
   pub fn new(id: Seat, gold: u32) -> Player {
      Player {
         id,
         gold,
         hand: Vec::new(),
         city: Vec::new(),
         character: None,
         build_limit: DEFAULT_BUILD_LIMIT,
      }
   }

   pub fn rank(&self) -> Option<u8> {
      self.character.map(Character::rank)
   }

   /// Assigning a character always resets the build allowance.
   pub fn assign_character(&mut self, character: Character) {
      self.character = Some(character);
      self.build_limit = DEFAULT_BUILD_LIMIT;
   }

   pub fn clear_character(&mut self) {
      self.character = None;
      self.build_limit = DEFAULT_BUILD_LIMIT;
   }

   pub fn gain_gold(&mut self, amount: u32) {
      self.gold += amount;
   }

   pub fn spend_gold(&mut self, amount: u32) -> Result<(), Refusal> {
      if amount > self.gold {
         return Err(Refusal::InsufficientGold {
            needed: amount,
            available: self.gold,
         });
      }
      self.gold -= amount;
      Ok(())
   }

   /// Empties the purse, returning what was in it.
   pub fn take_all_gold(&mut self) -> u32 {
      std::mem::replace(&mut self.gold, 0)
   }

   pub fn city_contains(&self, name: &str) -> bool {
      self.city.iter().any(|d| d.name() == name)
   }

   /// Adds straight to the city, keeping names unique.
   pub fn add_to_city(&mut self, card: DistrictCard) -> Result<(), Refusal> {
      if self.city_contains(card.name()) {
         return Err(Refusal::DuplicateDistrict);
      }
      self.city.push(card);
      Ok(())
   }

   pub fn color_count(&self, color: DistrictColor, wildcard_matches: bool) -> u32 {
      self.city.iter().filter(|d| d.counts_as(color, wildcard_matches)).count() as u32
   }

   /// Hand cards that could be built right now, ignoring the build limit.
   pub fn buildable(&self) -> impl Iterator<Item = (usize, &DistrictCard)> {
      self
         .hand
         .iter()
         .enumerate()
         .filter(move |(_, d)| d.cost() <= self.gold && !self.city_contains(d.name()))
   }
}

mod test {
   #[cfg(test)]
   use super::*;

   #[cfg(test)]
   fn district(name: &str, color: DistrictColor, cost: u32) -> DistrictCard {
      DistrictCard::new(name, color, cost, None)
   }

   #[test]
   fn city_never_holds_duplicate_names() {
      let mut p = Player::new(0, 2);
      assert!(p.add_to_city(district("Temple", DistrictColor::Blue, 1)).is_ok());
      assert_eq!(
         p.add_to_city(district("Temple", DistrictColor::Blue, 1)),
         Err(Refusal::DuplicateDistrict)
      );
      assert_eq!(p.city.len(), 1);
   }

   #[test]
   fn spending_more_than_owned_is_refused() {
      let mut p = Player::new(1, 3);
      assert_eq!(
         p.spend_gold(4),
         Err(Refusal::InsufficientGold {
            needed: 4,
            available: 3
         })
      );
      assert!(p.spend_gold(3).is_ok());
      assert_eq!(p.gold, 0);
      p.gain_gold(5);
      assert_eq!(p.take_all_gold(), 5);
      assert_eq!(p.gold, 0);
   }

   #[test]
   fn wildcard_counts_toward_colour_only_when_enabled() {
      let mut p = Player::new(0, 0);
      p.add_to_city(district("Castle", DistrictColor::Yellow, 4)).unwrap();
      p.add_to_city(district("School of Magic", DistrictColor::Purple, 6)).unwrap();
      assert_eq!(p.color_count(DistrictColor::Yellow, true), 2);
      assert_eq!(p.color_count(DistrictColor::Yellow, false), 1);
      assert_eq!(p.color_count(DistrictColor::Red, true), 1);
   }

   #[test]
   fn assignment_resets_build_limit() {
      let mut p = Player::new(2, 2);
      p.build_limit = 3;
      p.assign_character(Character::Merchant);
      assert_eq!(p.build_limit, DEFAULT_BUILD_LIMIT);
      assert_eq!(p.rank(), Some(6));
   }

   #[test]
   fn buildable_skips_owned_and_unaffordable() {
      let mut p = Player::new(0, 3);
      p.add_to_city(district("Tavern", DistrictColor::Green, 1)).unwrap();
      p.hand = vec![
         district("Tavern", DistrictColor::Green, 1),
         district("Manor", DistrictColor::Yellow, 3),
         district("Palace", DistrictColor::Yellow, 5),
      ];
      let names: Vec<&str> = p.buildable().map(|(_, d)| d.name()).collect();
      assert_eq!(names, vec!["Manor"]);
   }
}
