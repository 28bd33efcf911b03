use citadels::{Rank, Snapshot};

pub const ASSASSIN: Rank = 1;
pub const THIEF: Rank = 2;
pub const MAGICIAN: Rank = 3;
pub const KING: Rank = 4;
pub const BISHOP: Rank = 5;
pub const MERCHANT: Rank = 6;
pub const ARCHITECT: Rank = 7;
pub const WARLORD: Rank = 8;

/// Deals `roles[seat]` to each seat so the restored game starts in its turn phase.
pub fn with_roles(mut snapshot: Snapshot, roles: &[Rank]) -> Snapshot {
   for (player, rank) in snapshot.players.iter_mut().zip(roles.iter()) {
      player.character = Some(*rank);
   }
   snapshot
}

pub fn set_city(snapshot: &mut Snapshot, seat: usize, names: &[&str]) {
   snapshot.players[seat].city = names.iter().map(|n| n.to_string()).collect();
}

pub fn set_hand(snapshot: &mut Snapshot, seat: usize, names: &[&str]) {
   snapshot.players[seat].hand = names.iter().map(|n| n.to_string()).collect();
}

pub const CORRUPT_UNKNOWN_CARD: &str = r#"{
   "round": 2,
   "crowned_seat": 0,
   "supply": ["Tavern", "Moonbeam Tower"],
   "players": [
      { "id": 0, "gold": 2 },
      { "id": 1, "gold": 2 },
      { "id": 2, "gold": 2 },
      { "id": 3, "gold": 2 }
   ]
}"#;

pub const CORRUPT_BAD_SEAT: &str = r#"{
   "round": 2,
   "crowned_seat": 9,
   "supply": ["Tavern"],
   "players": [
      { "id": 0, "gold": 2 },
      { "id": 1, "gold": 2 },
      { "id": 2, "gold": 2 },
      { "id": 3, "gold": 2 }
   ]
}"#;

pub const CORRUPT_BAD_RANK: &str = r#"{
   "round": 2,
   "crowned_seat": 0,
   "killed_ranks": [12],
   "supply": ["Tavern"],
   "players": [
      { "id": 0, "gold": 2 },
      { "id": 1, "gold": 2 },
      { "id": 2, "gold": 2 },
      { "id": 3, "gold": 2 }
   ]
}"#;
