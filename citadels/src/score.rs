use crate::card::{Seat, Special, COLORS};
use crate::config::RuleConfig;
use crate::player::Player;

pub const DIVERSITY_BONUS: u32 = 3;
pub const FIRST_COMPLETED_BONUS: u32 = 4;
pub const COMPLETED_BONUS: u32 = 2;
pub const UNIQUE_BONUS: u32 = 2;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ScoreLine {
   pub seat: Seat,
   pub base: u32,
   pub diversity: u32,
   pub completion: u32,
   pub unique: u32,
   pub total: u32,
}

pub fn score_player(player: &Player, first_completed: Option<Seat>, rules: &RuleConfig) -> ScoreLine {
   let base: u32 = player.city.iter().map(|d| d.cost()).sum();

   let all_colors = COLORS
      .iter()
      .all(|c| player.city.iter().any(|d| d.counts_as(*c, rules.wildcard_counts_for_diversity)));
   let diversity = if all_colors { DIVERSITY_BONUS } else { 0 };

   let completion = if player.city.len() >= rules.completed_city {
      if first_completed == Some(player.id) {
         FIRST_COMPLETED_BONUS
      } else {
         COMPLETED_BONUS
      }
   } else {
      0
   };

   let unique = player
      .city
      .iter()
      .filter(|d| d.special() == Some(Special::BonusPoints))
      .count() as u32
      * UNIQUE_BONUS;

   ScoreLine {
      seat: player.id,
      base,
      diversity,
      completion,
      unique,
      total: base + diversity + completion + unique,
   }
}

pub fn compute(players: &[Player], first_completed: Option<Seat>, rules: &RuleConfig) -> Vec<ScoreLine> {
   players
      .iter()
      .map(|p| score_player(p, first_completed, rules))
      .collect()
}

/// Every seat tied at the top score.
pub fn winners(scores: &[ScoreLine]) -> Vec<Seat> {
   let best = match scores.iter().map(|s| s.total).max() {
      Some(best) => best,
      None => return Vec::new(),
   };
   scores.iter().filter(|s| s.total == best).map(|s| s.seat).collect()
}

mod test {
   #[cfg(test)]
   use super::*;
   #[cfg(test)]
   use crate::card::{DistrictCard, DistrictColor};

   #[cfg(test)]
   fn city(seat: Seat, districts: &[(&str, DistrictColor, u32)]) -> Player {
      let mut p = Player::new(seat, 0);
      for (name, color, cost) in districts {
         p.add_to_city(DistrictCard::new(*name, *color, *cost, None)).unwrap();
      }
      p
   }

   #[cfg(test)]
   fn eight_cheap(seat: Seat) -> Player {
      let names = ["A", "B", "C", "D", "E", "F", "G", "H"];
      let districts: Vec<_> = names.iter().map(|n| (*n, DistrictColor::Green, 1)).collect();
      city(seat, &districts)
   }

   #[test]
   fn five_colours_earn_diversity_bonus() {
      let p = city(
         0,
         &[
            ("Castle", DistrictColor::Yellow, 4),
            ("Temple", DistrictColor::Blue, 1),
            ("Tavern", DistrictColor::Green, 1),
            ("Watchtower", DistrictColor::Red, 1),
            ("Laboratory", DistrictColor::Purple, 6),
         ],
      );
      let line = score_player(&p, None, &RuleConfig::default());
      assert_eq!(line.base, 13);
      assert_eq!(line.diversity, 3);
      assert_eq!(line.completion, 0);
      assert_eq!(line.total, 16);
   }

   #[test]
   fn wildcard_fills_a_missing_colour() {
      let p = city(
         0,
         &[
            ("Castle", DistrictColor::Yellow, 4),
            ("Temple", DistrictColor::Blue, 1),
            ("Tavern", DistrictColor::Green, 1),
            ("School of Magic", DistrictColor::Purple, 6),
         ],
      );
      assert_eq!(score_player(&p, None, &RuleConfig::default()).diversity, 3);
      let strict = RuleConfig {
         wildcard_counts_for_diversity: false,
         ..RuleConfig::default()
      };
      assert_eq!(score_player(&p, None, &strict).diversity, 0);
   }

   #[test]
   fn completion_bonuses_favour_the_first() {
      let players = vec![eight_cheap(0), eight_cheap(1), city(2, &[("Manor", DistrictColor::Yellow, 3)])];
      let scores = compute(&players, Some(1), &RuleConfig::default());
      assert_eq!(scores[0].completion, 2);
      assert_eq!(scores[1].completion, 4);
      assert_eq!(scores[2].completion, 0);
      assert_eq!(winners(&scores), vec![1]);
   }

   #[test]
   fn dragon_gate_and_university_score_extra() {
      let p = city(
         3,
         &[
            ("Dragon Gate", DistrictColor::Purple, 6),
            ("University", DistrictColor::Purple, 6),
         ],
      );
      let line = score_player(&p, None, &RuleConfig::default());
      assert_eq!(line.unique, 4);
      assert_eq!(line.total, 16);
   }

   #[test]
   fn ties_share_the_win() {
      let players = vec![
         city(0, &[("Manor", DistrictColor::Yellow, 3)]),
         city(1, &[("Docks", DistrictColor::Green, 3)]),
         city(2, &[("Temple", DistrictColor::Blue, 1)]),
      ];
      let scores = compute(&players, None, &RuleConfig::default());
      assert_eq!(winners(&scores), vec![0, 1]);
      assert!(winners(&[]).is_empty());
   }
}
