use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;
use std::fmt::{self, Display};

/// Stable seat index. Seat 0 is the human seat in an interactive game.
pub type Seat = u8;
/// Character rank, 1 (Assassin) through 8 (Warlord).
pub type Rank = u8;

#[derive(Copy, Clone, Debug, Deserialize, Serialize, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub enum DistrictColor {
   Yellow,
   Blue,
   Green,
   Red,
   Purple,
}

pub const COLORS: [DistrictColor; 5] = [
   DistrictColor::Yellow,
   DistrictColor::Blue,
   DistrictColor::Green,
   DistrictColor::Red,
   DistrictColor::Purple,
];

impl DistrictColor {
   pub fn parse(raw: &str) -> Option<DistrictColor> {
      match raw.trim().to_ascii_lowercase().as_str() {
         "yellow" => Some(DistrictColor::Yellow),
         "blue" => Some(DistrictColor::Blue),
         "green" => Some(DistrictColor::Green),
         "red" => Some(DistrictColor::Red),
         "purple" => Some(DistrictColor::Purple),
         _ => None,
      }
   }
}

impl Display for DistrictColor {
   fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
      let s = match self {
         DistrictColor::Yellow => "yellow",
         DistrictColor::Blue => "blue",
         DistrictColor::Green => "green",
         DistrictColor::Red => "red",
         DistrictColor::Purple => "purple",
      };
      write!(f, "{}", s)
   }
}

/// Unique district behaviours the engine knows how to apply.
#[derive(Copy, Clone, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum Special {
   /// Library: keep both cards when drawing two.
   KeepBothDrawn,
   /// School of Magic: matches every colour.
   WildcardColor,
   /// Dragon Gate and University: two extra points at the end.
   BonusPoints,
}

impl Special {
   pub fn from_name(name: &str) -> Option<Special> {
      let name = name.to_ascii_lowercase().replace('_', " ");
      if name.contains("library") {
         Some(Special::KeepBothDrawn)
      } else if name.contains("school of magic") {
         Some(Special::WildcardColor)
      } else if name.contains("dragon gate") || name.contains("university") {
         Some(Special::BonusPoints)
      } else {
         None
      }
   }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub struct DistrictCard {
   name: String,
   color: DistrictColor,
   cost: u32,
   #[serde(default, skip_serializing_if = "Option::is_none")]
   special: Option<Special>,
   #[serde(default, skip_serializing_if = "Option::is_none")]
   text: Option<String>,
}

impl DistrictCard {
   pub fn new(name: impl Into<String>, color: DistrictColor, cost: u32, text: Option<String>) -> DistrictCard {
      let name = name.into();
      DistrictCard {
         special: Special::from_name(&name),
         text: text.filter(|t| !t.trim().is_empty()),
         name,
         color,
         cost,
      }
   }

   pub fn name(&self) -> &str {
      &self.name
   }

   pub fn color(&self) -> DistrictColor {
      self.color
   }

   pub fn cost(&self) -> u32 {
      self.cost
   }

   pub fn special(&self) -> Option<Special> {
      self.special
   }

   pub fn text(&self) -> Option<&str> {
      self.text.as_ref().map(String::as_str)
   }

   pub fn is_wildcard(&self) -> bool {
      self.special == Some(Special::WildcardColor)
   }

   /// Whether this district counts as `color`, optionally letting the wildcard match anything.
   pub fn counts_as(&self, color: DistrictColor, wildcard_matches: bool) -> bool {
      self.color == color || (wildcard_matches && self.is_wildcard())
   }
}

impl Display for DistrictCard {
   fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
      write!(f, "{} [{} {}]", self.name.replace('_', " "), self.color, self.cost)
   }
}

/// The eight character cards, in rank order.
#[derive(Copy, Clone, Debug, Deserialize, Serialize, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub enum Character {
   Assassin,
   Thief,
   Magician,
   King,
   Bishop,
   Merchant,
   Architect,
   Warlord,
}

pub const CHARACTERS: [Character; 8] = [
   Character::Assassin,
   Character::Thief,
   Character::Magician,
   Character::King,
   Character::Bishop,
   Character::Merchant,
   Character::Architect,
   Character::Warlord,
];

pub const KING_RANK: Rank = 4;
pub const BISHOP_RANK: Rank = 5;

impl Character {
   pub fn rank(self) -> Rank {
      self as u8 + 1
   }

   pub fn from_rank(rank: Rank) -> Option<Character> {
      if rank == 0 {
         return None;
      }
      CHARACTERS.get(rank as usize - 1).cloned()
   }

   pub fn name(self) -> &'static str {
      match self {
         Character::Assassin => "Assassin",
         Character::Thief => "Thief",
         Character::Magician => "Magician",
         Character::King => "King",
         Character::Bishop => "Bishop",
         Character::Merchant => "Merchant",
         Character::Architect => "Architect",
         Character::Warlord => "Warlord",
      }
   }

   pub fn from_name(name: &str) -> Option<Character> {
      let name = name.trim();
      CHARACTERS.iter().cloned().find(|c| c.name().eq_ignore_ascii_case(name))
   }

   /// One line describing the ability, shown by `info`.
   pub fn summary(self) -> &'static str {
      match self {
         Character::Assassin => "Kill a character of rank 2-8; their turn is skipped.",
         Character::Thief => "Rob a character of rank 3-8; take all their gold when their turn begins.",
         Character::Magician => "After building, swap hands with a player or redraw chosen cards.",
         Character::King => "Gain 1 gold per yellow district and take the crown.",
         Character::Bishop => "Gain 1 gold per blue district; the Warlord cannot target you.",
         Character::Merchant => "Gain 1 gold per green district, plus 1.",
         Character::Architect => "Draw 2 extra cards and build up to 3 districts.",
         Character::Warlord => "Gain 1 gold per red district; after building, destroy a district for its cost - 1.",
      }
   }

   /// Colour whose districts pay this character income, if any.
   pub fn income_color(self) -> Option<DistrictColor> {
      match self {
         Character::King => Some(DistrictColor::Yellow),
         Character::Bishop => Some(DistrictColor::Blue),
         Character::Merchant => Some(DistrictColor::Green),
         Character::Warlord => Some(DistrictColor::Red),
         _ => None,
      }
   }
}

impl Display for Character {
   fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
      write!(f, "{}", self.name())
   }
}

/// Ordered pile of cards. The front is the top.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Deck<T> {
   cards: VecDeque<T>,
}

impl<T> Deck<T> {
   pub fn new() -> Deck<T> {
      Deck { cards: VecDeque::new() }
   }

   pub fn draw(&mut self) -> Option<T> {
      self.cards.pop_front()
   }

   /// Draws up to `n` cards; a short deck yields what it has.
   pub fn draw_up_to(&mut self, n: usize) -> Vec<T> {
      let n = n.min(self.cards.len());
      self.cards.drain(..n).collect()
   }

   pub fn peek(&self) -> Option<&T> {
      self.cards.front()
   }

   pub fn put_on_bottom(&mut self, card: T) {
      self.cards.push_back(card);
   }

   pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
      self.cards.make_contiguous().shuffle(rng);
   }

   pub fn len(&self) -> usize {
      self.cards.len()
   }

   pub fn is_empty(&self) -> bool {
      self.cards.is_empty()
   }

   /// Top to bottom.
   pub fn iter(&self) -> impl Iterator<Item = &T> {
      self.cards.iter()
   }
}

impl<T> std::iter::FromIterator<T> for Deck<T> {
   fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Deck<T> {
      Deck {
         cards: iter.into_iter().collect(),
      }
   }
}

mod test {
   #[cfg(test)]
   use super::*;
   #[cfg(test)]
   use rand::rngs::StdRng;
   #[cfg(test)]
   use rand::SeedableRng;

   #[test]
   fn ranks_round_trip_through_characters() {
      for (i, c) in CHARACTERS.iter().enumerate() {
         assert_eq!(c.rank() as usize, i + 1);
         assert_eq!(Character::from_rank(c.rank()), Some(*c));
      }
      assert_eq!(Character::from_rank(0), None);
      assert_eq!(Character::from_rank(9), None);
      assert_eq!(Character::King.rank(), KING_RANK);
      assert_eq!(Character::Bishop.rank(), BISHOP_RANK);
   }

   #[test]
   fn only_four_characters_earn_district_income() {
      let paid: Vec<Character> = CHARACTERS.iter().cloned().filter(|c| c.income_color().is_some()).collect();
      assert_eq!(
         paid,
         vec![Character::King, Character::Bishop, Character::Merchant, Character::Warlord]
      );
      assert_eq!(Character::Bishop.income_color(), Some(DistrictColor::Blue));
   }

   #[test]
   fn character_names_match_case_insensitively() {
      assert_eq!(Character::from_name("  warlord "), Some(Character::Warlord));
      assert_eq!(Character::from_name("KING"), Some(Character::King));
      assert_eq!(Character::from_name("Jester"), None);
   }

   #[test]
   fn specials_are_tagged_by_name() {
      let lib = DistrictCard::new("Library", DistrictColor::Purple, 6, None);
      assert_eq!(lib.special(), Some(Special::KeepBothDrawn));
      let school = DistrictCard::new("School_of_Magic", DistrictColor::Purple, 6, None);
      assert!(school.is_wildcard());
      assert!(school.counts_as(DistrictColor::Red, true));
      assert!(!school.counts_as(DistrictColor::Red, false));
      assert_eq!(
         DistrictCard::new("University", DistrictColor::Purple, 6, None).special(),
         Some(Special::BonusPoints)
      );
      assert_eq!(DistrictCard::new("Tavern", DistrictColor::Green, 1, None).special(), None);
   }

   #[test]
   fn deck_draws_from_top_and_returns_to_bottom() {
      let mut deck: Deck<u8> = vec![1, 2, 3].into_iter().collect();
      assert_eq!(deck.peek(), Some(&1));
      assert_eq!(deck.draw(), Some(1));
      deck.put_on_bottom(9);
      assert_eq!(deck.iter().cloned().collect::<Vec<_>>(), vec![2, 3, 9]);
      assert_eq!(deck.draw_up_to(5), vec![2, 3, 9]);
      assert!(deck.is_empty());
      assert_eq!(deck.draw(), None);
   }

   #[test]
   fn seeded_shuffle_is_reproducible() {
      let mut a: Deck<u32> = (0..40).collect();
      let mut b = a.clone();
      a.shuffle(&mut StdRng::seed_from_u64(7));
      b.shuffle(&mut StdRng::seed_from_u64(7));
      assert_eq!(a, b);
      assert_eq!(a.len(), 40);
   }
}
