use crate::card::{Rank, Seat};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
   #[error("no district named {0:?} in the catalog")]
   UnknownDistrict(String),
   #[error("no character with rank {0}")]
   UnknownRank(Rank),
   #[error("catalog parsed but contained no valid district rows")]
   Empty,
   #[error("failed to read catalog: {0}")]
   Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum SetupError {
   #[error("a game needs 4-7 players, not {0}")]
   PlayerCount(usize),
   #[error("{players} seats but {sources} decision sources")]
   SourceCount { players: usize, sources: usize },
   #[error("the district supply is too small to deal opening hands")]
   SupplyExhausted,
   #[error(transparent)]
   Catalog(#[from] CatalogError),
}

/// A rule refused an action. The turn carries on without the effect.
#[derive(Clone, Debug, Error, PartialEq, Eq, Deserialize, Serialize)]
pub enum Refusal {
   #[error("that district is already in the city")]
   DuplicateDistrict,
   #[error("needs {needed} gold but only {available} available")]
   InsufficientGold { needed: u32, available: u32 },
   #[error("build limit of {0} reached this turn")]
   BuildLimitReached(u8),
   #[error("that card is not in hand")]
   NotInHand,
   #[error("player {} is protected by the Bishop", .0 + 1)]
   ProtectedTarget(Seat),
   #[error("player {} has a completed city", .0 + 1)]
   CompletedCity(Seat),
   #[error("no such district")]
   NoSuchDistrict,
   #[error("no such player")]
   NoSuchSeat,
   #[error("rank out of range")]
   RankOutOfRange,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
   #[error("corrupt snapshot: {0}")]
   Corrupt(String),
   #[error("snapshot is not valid JSON: {0}")]
   Json(#[from] serde_json::Error),
}

impl From<CatalogError> for SnapshotError {
   fn from(e: CatalogError) -> SnapshotError {
      SnapshotError::Corrupt(e.to_string())
   }
}
