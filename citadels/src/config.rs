pub const MIN_PLAYERS: usize = 4;
pub const MAX_PLAYERS: usize = 7;

pub(crate) fn default_players() -> usize {
   4
}

pub(crate) fn default_starting_gold() -> u32 {
   2
}

pub(crate) fn default_opening_hand() -> usize {
   4
}

pub(crate) fn default_completed_city() -> usize {
   8
}

pub(crate) fn default_true() -> bool {
   true
}

/// House rules. The wildcard flags decide whether School of Magic counts as every
/// colour for character income and for the five-colour bonus.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RuleConfig {
   #[serde(default = "default_starting_gold")]
   pub starting_gold: u32,
   #[serde(default = "default_opening_hand")]
   pub opening_hand: usize,
   #[serde(default = "default_completed_city")]
   pub completed_city: usize,
   #[serde(default = "default_true")]
   pub wildcard_counts_for_income: bool,
   #[serde(default = "default_true")]
   pub wildcard_counts_for_diversity: bool,
}

impl Default for RuleConfig {
   fn default() -> RuleConfig {
      RuleConfig {
         starting_gold: default_starting_gold(),
         opening_hand: default_opening_hand(),
         completed_city: default_completed_city(),
         wildcard_counts_for_income: true,
         wildcard_counts_for_diversity: true,
      }
   }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct GameConfig {
   #[serde(default = "default_players")]
   pub players: usize,
   /// Seeds tray and supply shuffling. `None` draws from entropy.
   #[serde(default)]
   pub seed: Option<u64>,
   #[serde(default)]
   pub rules: RuleConfig,
}

impl Default for GameConfig {
   fn default() -> GameConfig {
      GameConfig {
         players: default_players(),
         seed: None,
         rules: RuleConfig::default(),
      }
   }
}

impl GameConfig {
   pub fn with_players(players: usize) -> GameConfig {
      GameConfig {
         players,
         ..GameConfig::default()
      }
   }

   pub fn seeded(mut self, seed: u64) -> GameConfig {
      self.seed = Some(seed);
      self
   }

   /// How many characters are revealed face up during selection.
   pub fn face_up_count(&self) -> usize {
      match self.players {
         4 => 2,
         5 => 1,
         _ => 0,
      }
   }
}

mod test {
   #[cfg(test)]
   use super::*;

   #[test]
   fn face_up_reveals_depend_on_player_count() {
      assert_eq!(GameConfig::with_players(4).face_up_count(), 2);
      assert_eq!(GameConfig::with_players(5).face_up_count(), 1);
      assert_eq!(GameConfig::with_players(6).face_up_count(), 0);
      assert_eq!(GameConfig::with_players(7).face_up_count(), 0);
   }

   #[test]
   fn partial_config_fills_defaults() {
      let config: GameConfig = serde_json::from_str(r#"{ "players": 6, "rules": { "starting_gold": 3 } }"#).unwrap();
      assert_eq!(config.players, 6);
      assert_eq!(config.seed, None);
      assert_eq!(config.rules.starting_gold, 3);
      assert_eq!(config.rules.completed_city, 8);
      assert!(config.rules.wildcard_counts_for_diversity);
   }
}
