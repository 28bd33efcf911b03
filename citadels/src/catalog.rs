use crate::card::{Character, DistrictCard, DistrictColor, Rank, CHARACTERS};
use crate::error::CatalogError;
use std::collections::HashMap;
use std::path::Path;

const CLASSIC_TSV: &str = include_str!("cards.tsv");

/// Immutable card definitions, built once and handed to the engine.
#[derive(Clone, Debug)]
pub struct Catalog {
   supply: Vec<DistrictCard>,
   by_name: HashMap<String, DistrictCard>,
}

impl Catalog {
   /// The base set that ships with the crate.
   pub fn classic() -> Result<Catalog, CatalogError> {
      Catalog::from_tsv(CLASSIC_TSV)
   }

   pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Catalog, CatalogError> {
      let text = std::fs::read_to_string(path)?;
      Catalog::from_tsv(&text)
   }

   /// Parses `name, quantity, color, cost[, text...]` rows separated by tabs.
   /// Rows that don't parse are skipped; a catalog with no rows at all is an error.
   pub fn from_tsv(text: &str) -> Result<Catalog, CatalogError> {
      let mut supply = Vec::new();
      for (line_no, line) in text.lines().enumerate() {
         let line = line.trim();
         if line.is_empty() {
            continue;
         }
         let columns: Vec<&str> = line.split('\t').map(str::trim).collect();
         if columns.len() < 4 || columns[0].eq_ignore_ascii_case("name") || columns[0].is_empty() {
            continue;
         }
         let (quantity, cost) = match (columns[1].parse::<u32>(), columns[3].parse::<u32>()) {
            (Ok(q), Ok(c)) if c > 0 => (q, c),
            _ => {
               debug!("Skipping catalog line {}: bad quantity or cost", line_no + 1);
               continue;
            }
         };
         let color = match DistrictColor::parse(columns[2]) {
            Some(color) => color,
            None => {
               debug!("Skipping catalog line {}: unknown colour {:?}", line_no + 1, columns[2]);
               continue;
            }
         };
         let special_text = if columns.len() > 4 {
            Some(columns[4..].join(" "))
         } else {
            None
         };
         let card = DistrictCard::new(columns[0], color, cost, special_text);
         for _ in 0..quantity {
            supply.push(card.clone());
         }
      }

      if supply.is_empty() {
         return Err(CatalogError::Empty);
      }

      let mut by_name = HashMap::new();
      for card in supply.iter() {
         by_name.entry(card.name().to_string()).or_insert_with(|| card.clone());
      }
      trace!("Catalog loaded: {} cards, {} distinct districts", supply.len(), by_name.len());

      Ok(Catalog { supply, by_name })
   }

   pub fn district_by_name(&self, name: &str) -> Result<DistrictCard, CatalogError> {
      self
         .by_name
         .get(name)
         .cloned()
         .ok_or_else(|| CatalogError::UnknownDistrict(name.to_string()))
   }

   pub fn character_by_rank(&self, rank: Rank) -> Result<Character, CatalogError> {
      Character::from_rank(rank).ok_or(CatalogError::UnknownRank(rank))
   }

   /// Every card copy, in catalog order (unshuffled).
   pub fn supply(&self) -> &[DistrictCard] {
      &self.supply
   }

   /// The eight characters in rank order.
   pub fn characters(&self) -> &'static [Character; 8] {
      &CHARACTERS
   }

   /// Case-insensitive lookup used by `info`.
   pub fn find_district(&self, name: &str) -> Option<&DistrictCard> {
      let wanted = name.trim().replace('_', " ");
      self
         .by_name
         .values()
         .find(|d| d.name().replace('_', " ").eq_ignore_ascii_case(&wanted))
   }
}

mod test {
   #[cfg(test)]
   use super::*;
   #[cfg(test)]
   use crate::card::Special;

   #[test]
   fn classic_catalog_has_base_set() {
      let catalog = Catalog::classic().unwrap();
      assert_eq!(catalog.supply().len(), 66);
      let castle = catalog.district_by_name("Castle").unwrap();
      assert_eq!(castle.cost(), 4);
      assert_eq!(castle.color(), DistrictColor::Yellow);
      assert_eq!(
         catalog.district_by_name("Library").unwrap().special(),
         Some(Special::KeepBothDrawn)
      );
      assert_eq!(catalog.supply().iter().filter(|d| d.name() == "Manor").count(), 5);
   }

   #[test]
   fn only_applied_abilities_carry_text() {
      let catalog = Catalog::classic().unwrap();
      for name in ["Keep", "Great Wall", "Observatory", "Laboratory", "Smithy", "Graveyard", "Haunted City"].iter() {
         let card = catalog.district_by_name(name).unwrap();
         assert_eq!(card.text(), None, "{} describes an ability", name);
         assert_eq!(card.special(), None);
      }
      for name in ["Library", "School of Magic", "Dragon Gate", "University"].iter() {
         let card = catalog.district_by_name(name).unwrap();
         assert!(card.text().is_some());
         assert!(card.special().is_some());
      }
   }

   #[test]
   fn malformed_rows_are_skipped() {
      let tsv = "name\tqty\tcolor\tcost\n\
                 Tavern\t2\tgreen\t1\n\
                 Broken\tx\tgreen\t1\n\
                 Short\t1\tred\n\
                 Odd\t1\tmauve\t3\n\
                 Free\t1\tred\t0\n\
                 \n\
                 Keep\t1\tpurple\t3\tcannot\tbe destroyed\n";
      let catalog = Catalog::from_tsv(tsv).unwrap();
      assert_eq!(catalog.supply().len(), 3);
      assert_eq!(
         catalog.district_by_name("Keep").unwrap().text(),
         Some("cannot be destroyed")
      );
      assert!(catalog.district_by_name("Broken").is_err());
   }

   #[test]
   fn empty_catalog_is_fatal() {
      match Catalog::from_tsv("name\tqty\tcolor\tcost\nnope\n") {
         Err(CatalogError::Empty) => (),
         other => panic!("Expected empty catalog error, got {:?}", other),
      }
   }

   #[test]
   fn unknown_lookups_fail_descriptively() {
      let catalog = Catalog::classic().unwrap();
      let err = catalog.district_by_name("Moon Base").unwrap_err();
      assert!(err.to_string().contains("Moon Base"));
      assert!(catalog.character_by_rank(9).is_err());
      assert_eq!(catalog.character_by_rank(8).unwrap(), Character::Warlord);
      assert_eq!(catalog.characters()[0], Character::Assassin);
      assert_eq!(catalog.find_district("school of magic").unwrap().name(), "School of Magic");
   }
}
