use crate::card::{Character, DistrictCard, DistrictColor, Rank, Seat};
use crate::error::{Refusal, SnapshotError};
use std::fmt::{self, Display};

/// Narration of everything that happens at the table. Purely an output channel.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub enum GameEvent {
   RoundStarted { round: u32, crowned: Seat },
   SelectionStarted,
   CharacterRemovedFaceUp(Character),
   CharacterRemovedFaceDown,
   CharacterChosen { seat: Seat },
   TurnPhaseStarted,
   RankCalled(Character),
   RankKilled(Character),
   RankVacant(Character),
   TurnStarted { seat: Seat, character: Character },
   CrownTaken { seat: Seat },
   Killed { assassin: Seat, victim: Character },
   RobTargetChosen { thief: Seat, victim: Character },
   GoldStolen { thief: Seat, victim: Seat, amount: u32 },
   IncomeGained { seat: Seat, amount: u32, color: Option<DistrictColor> },
   Protected { seat: Seat },
   GoldCollected { seat: Seat, amount: u32 },
   CardsDrawn { seat: Seat, count: usize },
   CardKept { seat: Seat, kept_both: bool },
   Built { seat: Seat, district: DistrictCard },
   BuildRefused { seat: Seat, refusal: Refusal },
   HandsSwapped { seat: Seat, with: Seat },
   CardsRedrawn { seat: Seat, count: usize },
   Destroyed { warlord: Seat, victim: Seat, district: DistrictCard, paid: u32 },
   DestroyRefused { warlord: Seat, victim: Seat, refusal: Refusal },
   AbilityRefused { seat: Seat, refusal: Refusal },
   CityCompleted { seat: Seat },
   GameOver,
   FinalScore { seat: Seat, total: u32 },
   Winners(Vec<Seat>),
}

struct Who(Seat);

impl Display for Who {
   fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
      write!(f, "Player {}", self.0 + 1)
   }
}

impl Display for GameEvent {
   fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
      match self {
         GameEvent::RoundStarted { round, crowned } => {
            write!(f, "=== ROUND {} (Crown: {}) ===", round, Who(*crowned))
         }
         GameEvent::SelectionStarted => write!(f, "--- SELECTION PHASE ---"),
         GameEvent::CharacterRemovedFaceUp(c) => write!(f, "{} was removed.", c),
         GameEvent::CharacterRemovedFaceDown => write!(f, "A mystery character was removed."),
         GameEvent::CharacterChosen { seat } => write!(f, "{} chose a character.", Who(*seat)),
         GameEvent::TurnPhaseStarted => write!(f, "--- TURN PHASE ---"),
         GameEvent::RankCalled(c) => write!(f, "{}: {}", c.rank(), c),
         GameEvent::RankKilled(c) => write!(f, "The {} was killed; their turn is skipped.", c),
         GameEvent::RankVacant(c) => write!(f, "No one is the {}.", c),
         GameEvent::TurnStarted { seat, character } => write!(f, "{} is the {}.", Who(*seat), character),
         GameEvent::CrownTaken { seat } => write!(f, "{} takes the crown.", Who(*seat)),
         GameEvent::Killed { assassin, victim } => write!(f, "{} kills the {}.", Who(*assassin), victim),
         GameEvent::RobTargetChosen { thief, victim } => write!(f, "{} will rob the {}.", Who(*thief), victim),
         GameEvent::GoldStolen { thief, victim, amount } => write!(
            f,
            "The Thief ({}) steals {} gold from {}.",
            Who(*thief),
            amount,
            Who(*victim)
         ),
         GameEvent::IncomeGained { seat, amount, color } => match color {
            Some(color) => write!(f, "{} gains {} gold from {} districts.", Who(*seat), amount, color),
            None => write!(f, "{} gains {} gold.", Who(*seat), amount),
         },
         GameEvent::Protected { seat } => write!(f, "{}'s city is protected from the Warlord.", Who(*seat)),
         GameEvent::GoldCollected { seat, amount } => write!(f, "{} collected {} gold.", Who(*seat), amount),
         GameEvent::CardsDrawn { seat, count } => write!(f, "{} drew {} card(s).", Who(*seat), count),
         GameEvent::CardKept { seat, kept_both } => {
            if *kept_both {
               write!(f, "Library effect: {} kept both cards.", Who(*seat))
            } else {
               write!(f, "{} kept one card.", Who(*seat))
            }
         }
         GameEvent::Built { seat, district } => write!(f, "{} built {}.", Who(*seat), district),
         GameEvent::BuildRefused { seat, refusal } => write!(f, "{} cannot build: {}.", Who(*seat), refusal),
         GameEvent::HandsSwapped { seat, with } => write!(f, "{} swapped hands with {}.", Who(*seat), Who(*with)),
         GameEvent::CardsRedrawn { seat, count } => write!(f, "{} redrew {} card(s).", Who(*seat), count),
         GameEvent::Destroyed {
            warlord,
            victim,
            district,
            paid,
         } => write!(
            f,
            "{} destroyed {} in {}'s city for {} gold.",
            Who(*warlord),
            district,
            Who(*victim),
            paid
         ),
         GameEvent::DestroyRefused {
            warlord,
            victim,
            refusal,
         } => write!(
            f,
            "{} cannot destroy in {}'s city: {}.",
            Who(*warlord),
            Who(*victim),
            refusal
         ),
         GameEvent::AbilityRefused { seat, refusal } => write!(f, "{}'s ability had no effect: {}.", Who(*seat), refusal),
         GameEvent::CityCompleted { seat } => write!(f, "{} completed their city!", Who(*seat)),
         GameEvent::GameOver => write!(f, "=== FINAL SCORES ==="),
         GameEvent::FinalScore { seat, total } => write!(f, "{}: {} pts", Who(*seat), total),
         GameEvent::Winners(seats) => {
            if seats.len() == 1 {
               write!(f, "Congratulations {}!", Who(seats[0]))
            } else {
               let names: Vec<String> = seats.iter().map(|s| Who(*s).to_string()).collect();
               write!(f, "Tie between {}.", names.join(", "))
            }
         }
      }
   }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct PlayerSnapshot {
   pub id: Seat,
   pub gold: u32,
   #[serde(default)]
   pub character: Option<Rank>,
   #[serde(default)]
   pub hand: Vec<String>,
   #[serde(default)]
   pub city: Vec<String>,
}

/// Everything needed to rebuild an engine. Cards are referenced by name.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Snapshot {
   /// Tray shuffles are derived from this and the round number.
   #[serde(default)]
   pub seed: Option<u64>,
   pub round: u32,
   pub crowned_seat: Seat,
   #[serde(default)]
   pub robbed_rank: Option<Rank>,
   #[serde(default)]
   pub thief_seat: Option<Seat>,
   #[serde(default)]
   pub killed_ranks: Vec<Rank>,
   #[serde(default)]
   pub bishop_protected: Vec<Seat>,
   pub supply: Vec<String>,
   pub players: Vec<PlayerSnapshot>,
}

impl Snapshot {
   pub fn to_json(&self) -> Result<String, SnapshotError> {
      Ok(serde_json::to_string_pretty(self)?)
   }

   pub fn from_json(json: &str) -> Result<Snapshot, SnapshotError> {
      Ok(serde_json::from_str(json)?)
   }
}

mod test {
   #[cfg(test)]
   use super::*;

   #[test]
   fn events_read_like_table_talk() {
      let e = GameEvent::GoldStolen {
         thief: 1,
         victim: 0,
         amount: 5,
      };
      assert_eq!(e.to_string(), "The Thief (Player 2) steals 5 gold from Player 1.");
      assert_eq!(
         GameEvent::Winners(vec![0, 2]).to_string(),
         "Tie between Player 1, Player 3."
      );
      assert_eq!(GameEvent::RankCalled(Character::Warlord).to_string(), "8: Warlord");
   }

   #[test]
   fn snapshot_defaults_missing_round_flags() {
      let json = r#"{
         "round": 3,
         "crowned_seat": 1,
         "supply": ["Tavern"],
         "players": [{ "id": 0, "gold": 4 }]
      }"#;
      let snapshot = Snapshot::from_json(json).unwrap();
      assert_eq!(snapshot.robbed_rank, None);
      assert!(snapshot.killed_ranks.is_empty());
      assert!(snapshot.players[0].hand.is_empty());
      assert_eq!(snapshot.players[0].character, None);
   }

   #[test]
   fn garbage_json_is_reported() {
      match Snapshot::from_json("{ not json") {
         Err(SnapshotError::Json(_)) => (),
         other => panic!("Expected json error, got {:?}", other),
      }
   }
}
