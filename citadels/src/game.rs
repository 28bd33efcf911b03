use crate::ability::{self, Timing};
use crate::ai::{DecisionSource, GameView, KeptCard, MagicianAction, Purpose, ResourceChoice};
use crate::card::{Character, Deck, DistrictCard, DistrictColor, Rank, Seat, Special, BISHOP_RANK, KING_RANK};
use crate::catalog::Catalog;
use crate::config::{GameConfig, MAX_PLAYERS, MIN_PLAYERS};
use crate::data::{GameEvent, PlayerSnapshot, Snapshot};
use crate::error::{Refusal, SetupError, SnapshotError};
use crate::player::Player;
use crate::score::{self, ScoreLine};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeSet, HashMap};
use std::fmt::Debug;

pub const COLLECT_GOLD_AMOUNT: u32 = 2;
pub const DRAW_COUNT: usize = 2;
pub const ARCHITECT_EXTRA_CARDS: usize = 2;
pub const ARCHITECT_BUILD_LIMIT: u8 = 3;
/// How many times a source is re-asked for a legal answer before the engine picks for it.
pub const MAX_DECISION_ATTEMPTS: usize = 16;

#[derive(Copy, Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum Phase {
   Selection,
   Turn,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Robbery {
   pub rank: Rank,
   pub thief: Seat,
}

/// Owns every piece of mutable game state. Abilities and decision sources only
/// reach it through the methods below.
pub struct Game {
   config: GameConfig,
   catalog: Catalog,
   players: Vec<Player>,
   sources: Vec<Box<dyn DecisionSource>>,
   computer: Vec<bool>,
   supply: Deck<DistrictCard>,
   seed: u64,
   round: u32,
   crowned: Seat,
   phase: Phase,
   killed: BTreeSet<Rank>,
   robbery: Option<Robbery>,
   protected: BTreeSet<Seat>,
   built_this_turn: HashMap<Seat, u8>,
   events: Vec<GameEvent>,
}

fn pick_seed(config: &GameConfig) -> u64 {
   config.seed.unwrap_or_else(|| StdRng::from_entropy().gen())
}

fn check_seat_count(players: usize, sources: usize) -> Result<(), SetupError> {
   if players < MIN_PLAYERS || players > MAX_PLAYERS {
      return Err(SetupError::PlayerCount(players));
   }
   if players != sources {
      return Err(SetupError::SourceCount { players, sources });
   }
   Ok(())
}

impl Game {
   /// Shuffles the supply and deals opening hands. Seat 0 holds the crown.
   pub fn new(config: GameConfig, catalog: Catalog, sources: Vec<Box<dyn DecisionSource>>) -> Result<Game, SetupError> {
      check_seat_count(config.players, sources.len())?;

      let seed = pick_seed(&config);
      let mut supply: Deck<DistrictCard> = catalog.supply().iter().cloned().collect();
      supply.shuffle(&mut StdRng::seed_from_u64(seed));

      let mut players = Vec::with_capacity(config.players);
      for seat in 0..config.players {
         let mut player = Player::new(seat as Seat, config.rules.starting_gold);
         let hand = supply.draw_up_to(config.rules.opening_hand);
         if hand.len() < config.rules.opening_hand {
            return Err(SetupError::SupplyExhausted);
         }
         player.hand = hand;
         players.push(player);
      }
      info!("New game: {} players, {} cards left in supply", players.len(), supply.len());

      Ok(Game {
         computer: sources.iter().map(|s| s.is_computer()).collect(),
         config,
         catalog,
         players,
         sources,
         supply,
         seed,
         round: 1,
         crowned: 0,
         phase: Phase::Selection,
         killed: BTreeSet::new(),
         robbery: None,
         protected: BTreeSet::new(),
         built_this_turn: HashMap::new(),
         events: Vec::new(),
      })
   }

   /// Rebuilds an engine from a snapshot. Any unknown card, rank or seat rejects the whole snapshot.
   pub fn restore(
      snapshot: &Snapshot,
      mut config: GameConfig,
      catalog: Catalog,
      sources: Vec<Box<dyn DecisionSource>>,
   ) -> Result<Game, SnapshotError> {
      let n = snapshot.players.len();
      check_seat_count(n, sources.len()).map_err(|e| SnapshotError::Corrupt(e.to_string()))?;
      config.players = n;

      let corrupt = |reason: String| SnapshotError::Corrupt(reason);
      let seat_ok = |seat: Seat| (seat as usize) < n;

      if snapshot.round == 0 {
         return Err(corrupt("round must start at 1".into()));
      }
      if !seat_ok(snapshot.crowned_seat) {
         return Err(corrupt(format!("crowned seat {} out of range", snapshot.crowned_seat)));
      }

      let mut slots: Vec<Option<Player>> = vec![None; n];
      let mut ranks_taken = BTreeSet::new();
      for ps in snapshot.players.iter() {
         let player = restore_player(ps, &catalog, &config)?;
         if !seat_ok(ps.id) || slots[ps.id as usize].is_some() {
            return Err(corrupt(format!("player id {} out of range or repeated", ps.id)));
         }
         if let Some(rank) = player.rank() {
            if !ranks_taken.insert(rank) {
               return Err(corrupt(format!("rank {} assigned twice", rank)));
            }
         }
         slots[ps.id as usize] = Some(player);
      }
      let players: Vec<Player> = slots.into_iter().flatten().collect();

      let mut killed = BTreeSet::new();
      for rank in snapshot.killed_ranks.iter() {
         if Character::from_rank(*rank).is_none() {
            return Err(corrupt(format!("killed rank {} out of range", rank)));
         }
         killed.insert(*rank);
      }

      let mut protected = BTreeSet::new();
      for seat in snapshot.bishop_protected.iter() {
         if !seat_ok(*seat) {
            return Err(corrupt(format!("protected seat {} out of range", seat)));
         }
         protected.insert(*seat);
      }

      let robbery = match snapshot.robbed_rank {
         None => None,
         Some(rank) => {
            if Character::from_rank(rank).is_none() {
               return Err(corrupt(format!("robbed rank {} out of range", rank)));
            }
            let thief = match snapshot.thief_seat {
               Some(seat) if seat_ok(seat) => seat,
               Some(seat) => return Err(corrupt(format!("thief seat {} out of range", seat))),
               None => players
                  .iter()
                  .find(|p| p.character == Some(Character::Thief))
                  .map(|p| p.id)
                  .ok_or_else(|| corrupt("robbery recorded without a thief".into()))?,
            };
            Some(Robbery { rank, thief })
         }
      };

      let mut supply = Deck::new();
      for name in snapshot.supply.iter() {
         supply.put_on_bottom(catalog.district_by_name(name)?);
      }

      // Characters already dealt means the snapshot was taken after selection.
      let phase = if players.iter().any(|p| p.character.is_some()) {
         Phase::Turn
      } else {
         Phase::Selection
      };
      let seed = snapshot.seed.unwrap_or_else(|| pick_seed(&config));

      info!("Restored game at round {} with {} players", snapshot.round, n);

      Ok(Game {
         computer: sources.iter().map(|s| s.is_computer()).collect(),
         seed,
         config,
         catalog,
         players,
         sources,
         supply,
         round: snapshot.round,
         crowned: snapshot.crowned_seat,
         phase,
         killed,
         robbery,
         protected,
         built_this_turn: HashMap::new(),
         events: Vec::new(),
      })
   }

   pub fn snapshot(&self) -> Snapshot {
      let names = |cards: &[DistrictCard]| cards.iter().map(|d| d.name().to_string()).collect::<Vec<_>>();
      Snapshot {
         seed: Some(self.seed),
         round: self.round,
         crowned_seat: self.crowned,
         robbed_rank: self.robbery.map(|r| r.rank),
         thief_seat: self.robbery.map(|r| r.thief),
         killed_ranks: self.killed.iter().cloned().collect(),
         bishop_protected: self.protected.iter().cloned().collect(),
         supply: self.supply.iter().map(|d| d.name().to_string()).collect(),
         players: self
            .players
            .iter()
            .map(|p| PlayerSnapshot {
               id: p.id,
               gold: p.gold,
               character: p.rank(),
               hand: names(&p.hand),
               city: names(&p.city),
            })
            .collect(),
      }
   }

   // ------------------------------------------------------------------
   // Round driver
   // ------------------------------------------------------------------

   pub fn play_round(&mut self) {
      info!("Round {} begins, crown at seat {}", self.round, self.crowned);
      self.emit(GameEvent::RoundStarted {
         round: self.round,
         crowned: self.crowned,
      });

      if self.phase == Phase::Selection {
         self.selection_phase();
      }
      self.turn_phase();
      self.end_round();
   }

   /// Plays whole rounds until a city is complete, then scores.
   pub fn play_to_end(&mut self) -> Vec<ScoreLine> {
      while !self.is_game_over() {
         self.play_round();
      }
      self.announce_results()
   }

   pub fn is_game_over(&self) -> bool {
      self.players.iter().any(|p| self.is_complete(p))
   }

   pub fn scores(&self) -> Vec<ScoreLine> {
      score::compute(&self.players, self.first_completed(), &self.config.rules)
   }

   pub fn winners(&self) -> Vec<Seat> {
      score::winners(&self.scores())
   }

   /// Scores the game and narrates the result.
   pub fn announce_results(&mut self) -> Vec<ScoreLine> {
      let scores = self.scores();
      self.emit(GameEvent::GameOver);
      for line in scores.iter() {
         self.emit(GameEvent::FinalScore {
            seat: line.seat,
            total: line.total,
         });
      }
      let winners = score::winners(&scores);
      info!("Game over after {} rounds; winners: {:?}", self.round - 1, winners);
      self.emit(GameEvent::Winners(winners));
      scores
   }

   fn selection_phase(&mut self) {
      self.phase = Phase::Selection;
      self.emit(GameEvent::SelectionStarted);

      let face_up_count = self.config.face_up_count();
      let mut rng = self.round_rng();
      let (face_up, mut pool) = loop {
         let mut tray: Deck<Character> = self.catalog.characters().iter().cloned().collect();
         tray.shuffle(&mut rng);
         let face_up = tray.draw_up_to(face_up_count);
         if face_up.contains(&Character::King) {
            trace!("King drawn face up; reshuffling the tray");
            continue;
         }
         let hidden = tray.draw();
         trace!("Face-down character: {:?}", hidden);
         break (face_up, tray.iter().cloned().collect::<Vec<_>>());
      };

      for c in face_up {
         self.emit(GameEvent::CharacterRemovedFaceUp(c));
      }
      self.emit(GameEvent::CharacterRemovedFaceDown);

      let n = self.players.len();
      for i in 0..n {
         let seat = ((self.crowned as usize + i) % n) as Seat;
         let chosen = self.request_character(seat, &pool);
         pool.retain(|c| *c != chosen);
         self.players[seat as usize].assign_character(chosen);
         debug!("Seat {} picked {}", seat, chosen);
         self.emit(GameEvent::CharacterChosen { seat });
      }
   }

   fn turn_phase(&mut self) {
      self.phase = Phase::Turn;
      self.emit(GameEvent::TurnPhaseStarted);

      for character in self.catalog.characters().iter().cloned() {
         let rank = character.rank();
         self.emit(GameEvent::RankCalled(character));
         if self.killed.contains(&rank) {
            self.emit(GameEvent::RankKilled(character));
            continue;
         }
         match self.find_acting_player(rank) {
            Some(seat) => self.take_turn(seat, character),
            None => self.emit(GameEvent::RankVacant(character)),
         }
      }
   }

   fn take_turn(&mut self, seat: Seat, character: Character) {
      let rank = character.rank();
      self.built_this_turn.insert(seat, 0);
      self.emit(GameEvent::TurnStarted { seat, character });

      if rank == KING_RANK {
         self.take_crown(seat);
      }
      self.resolve_robbery(seat, rank);

      ability::resolve(self, seat, character, Timing::Start);
      self.resource_phase(seat);
      ability::resolve(self, seat, character, Timing::BeforeBuild);
      self.build_phase(seat);
      ability::resolve(self, seat, character, Timing::AfterBuild);
   }

   fn resolve_robbery(&mut self, seat: Seat, rank: Rank) {
      let robbery = match self.robbery {
         Some(r) if r.rank == rank => r,
         _ => return,
      };
      self.robbery = None;
      if robbery.thief == seat {
         return;
      }
      let amount = self.players[seat as usize].take_all_gold();
      self.players[robbery.thief as usize].gain_gold(amount);
      debug!("Seat {} robbed seat {} of {} gold", robbery.thief, seat, amount);
      self.emit(GameEvent::GoldStolen {
         thief: robbery.thief,
         victim: seat,
         amount,
      });
   }

   fn resource_phase(&mut self, seat: Seat) {
      match self.ask(seat, |s, v| s.choose_resource(v)) {
         ResourceChoice::Gold => self.collect_gold(seat),
         ResourceChoice::Cards => self.draw_two_choose(seat),
      }
   }

   fn build_phase(&mut self, seat: Seat) {
      let mut refusals = 0;
      while self.builds_left(seat) > 0 {
         let index = match self.ask(seat, |s, v| s.choose_build(v)) {
            Some(index) => index,
            None => break,
         };
         if let Err(refusal) = self.build_from_hand(seat, index) {
            refusals += 1;
            if refusals >= MAX_DECISION_ATTEMPTS {
               error!(
                  "Seat {} ({}) kept choosing illegal builds; ending its build step",
                  seat,
                  self.sources[seat as usize].strategy_name()
               );
               break;
            }
            debug!("Seat {} build refused: {}", seat, refusal);
         }
      }
   }

   fn end_round(&mut self) {
      self.round += 1;
      self.killed.clear();
      self.robbery = None;
      self.protected.clear();
      self.built_this_turn.clear();
      for p in self.players.iter_mut() {
         p.clear_character();
      }
      self.phase = Phase::Selection;
   }

   // ------------------------------------------------------------------
   // Accessors
   // ------------------------------------------------------------------

   pub fn round(&self) -> u32 {
      self.round
   }

   pub fn seed(&self) -> u64 {
      self.seed
   }

   /// Each round shuffles from its own stream so a restored game deals the same trays.
   fn round_rng(&self) -> StdRng {
      StdRng::seed_from_u64(self.seed ^ u64::from(self.round).wrapping_mul(0x9E37_79B9_7F4A_7C15))
   }

   pub fn crowned_seat(&self) -> Seat {
      self.crowned
   }

   pub fn phase(&self) -> Phase {
      self.phase
   }

   pub fn players(&self) -> &[Player] {
      &self.players
   }

   pub fn player(&self, seat: Seat) -> Option<&Player> {
      self.players.get(seat as usize)
   }

   pub fn config(&self) -> &GameConfig {
      &self.config
   }

   pub fn catalog(&self) -> &Catalog {
      &self.catalog
   }

   pub fn supply(&self) -> &Deck<DistrictCard> {
      &self.supply
   }

   pub fn killed_ranks(&self) -> &BTreeSet<Rank> {
      &self.killed
   }

   pub fn robbery(&self) -> Option<Robbery> {
      self.robbery
   }

   pub fn protected_seats(&self) -> &BTreeSet<Seat> {
      &self.protected
   }

   pub fn is_protected(&self, seat: Seat) -> bool {
      self.protected.contains(&seat)
   }

   pub fn built_this_turn(&self, seat: Seat) -> u8 {
      self.built_this_turn.get(&seat).cloned().unwrap_or(0)
   }

   pub fn builds_left(&self, seat: Seat) -> u8 {
      match self.players.get(seat as usize) {
         Some(p) => p.build_limit.saturating_sub(self.built_this_turn(seat)),
         None => 0,
      }
   }

   /// The lowest seat holding a complete city, whatever order the cities were finished in.
   /// Complete cities cannot lose districts, so this never changes once set.
   pub fn first_completed(&self) -> Option<Seat> {
      self.players.iter().filter(|p| self.is_complete(p)).map(|p| p.id).min()
   }

   pub fn find_acting_player(&self, rank: Rank) -> Option<Seat> {
      self.players.iter().find(|p| p.rank() == Some(rank)).map(|p| p.id)
   }

   pub fn strategy_name(&self, seat: Seat) -> &'static str {
      self.sources[seat as usize].strategy_name()
   }

   pub fn events(&self) -> &[GameEvent] {
      &self.events
   }

   pub fn drain_events(&mut self) -> Vec<GameEvent> {
      std::mem::replace(&mut self.events, Vec::new())
   }

   fn is_complete(&self, player: &Player) -> bool {
      player.city.len() >= self.config.rules.completed_city
   }

   fn seat_index(&self, seat: Seat) -> Result<usize, Refusal> {
      if (seat as usize) < self.players.len() {
         Ok(seat as usize)
      } else {
         Err(Refusal::NoSuchSeat)
      }
   }

   // ------------------------------------------------------------------
   // Mutators
   // ------------------------------------------------------------------

   pub fn collect_gold(&mut self, seat: Seat) {
      self.players[seat as usize].gain_gold(COLLECT_GOLD_AMOUNT);
      self.emit(GameEvent::GoldCollected {
         seat,
         amount: COLLECT_GOLD_AMOUNT,
      });
   }

   /// Draws two; Library owners keep both, everyone else keeps one and the other goes under the supply.
   pub fn draw_two_choose(&mut self, seat: Seat) {
      let mut drawn = self.supply.draw_up_to(DRAW_COUNT);
      self.emit(GameEvent::CardsDrawn {
         seat,
         count: drawn.len(),
      });
      let keeps_both = self.players[seat as usize]
         .city
         .iter()
         .any(|d| d.special() == Some(Special::KeepBothDrawn));
      if drawn.len() < DRAW_COUNT || keeps_both {
         let kept_both = drawn.len() == DRAW_COUNT;
         self.players[seat as usize].hand.append(&mut drawn);
         self.emit(GameEvent::CardKept { seat, kept_both });
         return;
      }

      let second = drawn.pop();
      let first = drawn.pop();
      let (first, second) = match (first, second) {
         (Some(a), Some(b)) => (a, b),
         _ => return,
      };
      let (keep, discard) = match self.ask(seat, |s, v| s.choose_kept_card(v, &first, &second)) {
         KeptCard::First => (first, second),
         KeptCard::Second => (second, first),
      };
      self.players[seat as usize].hand.push(keep);
      self.supply.put_on_bottom(discard);
      self.emit(GameEvent::CardKept {
         seat,
         kept_both: false,
      });
   }

   pub fn draw_cards(&mut self, seat: Seat, n: usize) -> usize {
      let drawn = self.supply.draw_up_to(n);
      let count = drawn.len();
      self.players[seat as usize].hand.extend(drawn);
      self.emit(GameEvent::CardsDrawn { seat, count });
      count
   }

   /// One gold per district of `color`, plus a flat `bonus`.
   pub fn gain_income(&mut self, seat: Seat, color: DistrictColor, bonus: u32) -> u32 {
      let wildcard = self.config.rules.wildcard_counts_for_income;
      let player = &mut self.players[seat as usize];
      let amount = player.color_count(color, wildcard) + bonus;
      player.gain_gold(amount);
      self.emit(GameEvent::IncomeGained {
         seat,
         amount,
         color: Some(color),
      });
      amount
   }

   pub fn build_from_hand(&mut self, seat: Seat, index: usize) -> Result<(), Refusal> {
      let card = match self.players.get(seat as usize).and_then(|p| p.hand.get(index)) {
         Some(card) => card.clone(),
         None => {
            self.emit(GameEvent::BuildRefused {
               seat,
               refusal: Refusal::NotInHand,
            });
            return Err(Refusal::NotInHand);
         }
      };
      self.build_district(seat, &card)
   }

   /// Moves `card` from hand to city if the build limit, uniqueness and gold allow it.
   pub fn build_district(&mut self, seat: Seat, card: &DistrictCard) -> Result<(), Refusal> {
      let result = self.try_build(seat, card);
      match &result {
         Ok(()) => {
            self.emit(GameEvent::Built {
               seat,
               district: card.clone(),
            });
            if self.players[seat as usize].city.len() == self.config.rules.completed_city {
               info!("Seat {} completed a city", seat);
               self.emit(GameEvent::CityCompleted { seat });
            }
         }
         Err(refusal) => {
            warn!("Seat {} cannot build {}: {}", seat, card, refusal);
            self.emit(GameEvent::BuildRefused {
               seat,
               refusal: refusal.clone(),
            });
         }
      }
      result
   }

   fn try_build(&mut self, seat: Seat, card: &DistrictCard) -> Result<(), Refusal> {
      let i = self.seat_index(seat)?;
      let built = self.built_this_turn(seat);
      let player = &mut self.players[i];
      if built >= player.build_limit {
         return Err(Refusal::BuildLimitReached(player.build_limit));
      }
      if player.city_contains(card.name()) {
         return Err(Refusal::DuplicateDistrict);
      }
      let pos = player.hand.iter().position(|d| d == card).ok_or(Refusal::NotInHand)?;
      player.spend_gold(card.cost())?;
      let card = player.hand.remove(pos);
      player.add_to_city(card)?;
      let limit = player.build_limit;
      self.built_this_turn.insert(seat, (built + 1).min(limit));
      Ok(())
   }

   pub fn kill_rank(&mut self, assassin: Seat, rank: Rank) -> Result<(), Refusal> {
      let victim = match Character::from_rank(rank) {
         Some(c) if rank >= 2 => c,
         _ => return Err(Refusal::RankOutOfRange),
      };
      self.killed.insert(rank);
      if rank == BISHOP_RANK {
         if let Some(bishop) = self.find_acting_player(rank) {
            self.protected.remove(&bishop);
         }
      }
      self.emit(GameEvent::Killed { assassin, victim });
      Ok(())
   }

   pub fn set_rob_target(&mut self, thief: Seat, rank: Rank) -> Result<(), Refusal> {
      let victim = match Character::from_rank(rank) {
         Some(c) if rank >= 3 => c,
         _ => return Err(Refusal::RankOutOfRange),
      };
      self.seat_index(thief)?;
      self.robbery = Some(Robbery { rank, thief });
      self.emit(GameEvent::RobTargetChosen { thief, victim });
      Ok(())
   }

   pub fn swap_hands(&mut self, seat: Seat, with: Seat) -> Result<(), Refusal> {
      let a = self.seat_index(seat)?;
      let b = self.seat_index(with)?;
      if a == b {
         return Err(Refusal::NoSuchSeat);
      }
      let hand_a = std::mem::replace(&mut self.players[a].hand, Vec::new());
      let hand_b = std::mem::replace(&mut self.players[b].hand, hand_a);
      self.players[a].hand = hand_b;
      self.emit(GameEvent::HandsSwapped { seat, with });
      Ok(())
   }

   /// Discards the given hand positions, draws as many replacements, then puts the discards under the supply.
   pub fn discard_and_redraw(&mut self, seat: Seat, indices: &[usize]) -> Result<usize, Refusal> {
      let i = self.seat_index(seat)?;
      let mut indices = indices.to_vec();
      indices.sort_unstable();
      indices.dedup();
      if indices.iter().any(|idx| *idx >= self.players[i].hand.len()) {
         return Err(Refusal::NotInHand);
      }
      let mut discarded = Vec::with_capacity(indices.len());
      for idx in indices.iter().rev() {
         discarded.push(self.players[i].hand.remove(*idx));
      }
      let drawn = self.supply.draw_up_to(discarded.len());
      let count = drawn.len();
      self.players[i].hand.extend(drawn);
      for card in discarded.into_iter().rev() {
         self.supply.put_on_bottom(card);
      }
      self.emit(GameEvent::CardsRedrawn { seat, count });
      Ok(count)
   }

   /// Idempotent: the crown only moves when someone else holds it.
   pub fn take_crown(&mut self, seat: Seat) {
      if self.crowned != seat {
         self.crowned = seat;
         self.emit(GameEvent::CrownTaken { seat });
      }
   }

   pub fn set_bishop_protection(&mut self, seat: Seat, on: bool) {
      if on {
         if self.protected.insert(seat) {
            self.emit(GameEvent::Protected { seat });
         }
      } else {
         self.protected.remove(&seat);
      }
   }

   pub fn set_build_limit(&mut self, seat: Seat, limit: u8) {
      self.players[seat as usize].build_limit = limit;
   }

   /// Pays `max(0, cost - 1)` to remove a district. Completed or protected cities are off limits.
   pub fn destroy_district(&mut self, warlord: Seat, victim: Seat, index: usize) -> Result<u32, Refusal> {
      let result = self.try_destroy(warlord, victim, index);
      match &result {
         Ok((district, paid)) => {
            info!("Seat {} destroyed {} of seat {}", warlord, district, victim);
            self.emit(GameEvent::Destroyed {
               warlord,
               victim,
               district: district.clone(),
               paid: *paid,
            });
         }
         Err(refusal) => {
            warn!("Seat {} cannot destroy in seat {}: {}", warlord, victim, refusal);
            self.emit(GameEvent::DestroyRefused {
               warlord,
               victim,
               refusal: refusal.clone(),
            });
         }
      }
      result.map(|(_, paid)| paid)
   }

   fn try_destroy(&mut self, warlord: Seat, victim: Seat, index: usize) -> Result<(DistrictCard, u32), Refusal> {
      let w = self.seat_index(warlord)?;
      let v = self.seat_index(victim)?;
      if self.is_complete(&self.players[v]) {
         return Err(Refusal::CompletedCity(victim));
      }
      if self.protected.contains(&victim) {
         return Err(Refusal::ProtectedTarget(victim));
      }
      let cost = match self.players[v].city.get(index) {
         Some(d) => d.cost().saturating_sub(1),
         None => return Err(Refusal::NoSuchDistrict),
      };
      self.players[w].spend_gold(cost)?;
      let district = self.players[v].city.remove(index);
      self.supply.put_on_bottom(district.clone());
      Ok((district, cost))
   }

   pub(crate) fn refuse(&mut self, seat: Seat, refusal: Refusal) {
      warn!("Seat {} ability refused: {}", seat, refusal);
      self.emit(GameEvent::AbilityRefused { seat, refusal });
   }

   // ------------------------------------------------------------------
   // Decisions
   // ------------------------------------------------------------------

   fn emit(&mut self, event: GameEvent) {
      trace!("{}", event);
      for source in self.sources.iter_mut() {
         source.on_event(&event);
      }
      self.events.push(event);
   }

   fn ask<T, F>(&mut self, seat: Seat, f: F) -> T
   where
      F: FnOnce(&mut dyn DecisionSource, &GameView) -> T,
   {
      let view = GameView {
         round: self.round,
         me: seat,
         crowned: self.crowned,
         players: &self.players,
         computer: &self.computer,
         killed: &self.killed,
         protected: &self.protected,
         supply_len: self.supply.len(),
         rules: &self.config.rules,
      };
      f(self.sources[seat as usize].as_mut(), &view)
   }

   /// Asks until `valid` accepts the answer, then gives up and uses `fallback`.
   fn request<T, F, V>(&mut self, seat: Seat, what: &str, fallback: T, mut ask: F, valid: V) -> T
   where
      T: Debug,
      F: FnMut(&mut dyn DecisionSource, &GameView) -> T,
      V: Fn(&T) -> bool,
   {
      for _ in 0..MAX_DECISION_ATTEMPTS {
         let answer = self.ask(seat, |s, v| ask(s, v));
         if valid(&answer) {
            debug!("Seat {} chose {} {:?}", seat, what, answer);
            return answer;
         }
         warn!("Seat {} gave an illegal {} ({:?}); asking again", seat, what, answer);
      }
      error!(
         "Seat {} ({}) never gave a legal {}; falling back to {:?}",
         seat,
         self.sources[seat as usize].strategy_name(),
         what,
         fallback
      );
      fallback
   }

   fn request_character(&mut self, seat: Seat, pool: &[Character]) -> Character {
      let fallback = pool[0].name().to_string();
      let name = self.request(
         seat,
         "character",
         fallback,
         |s, v| s.choose_character(v, pool),
         |name| Character::from_name(name).map_or(false, |c| pool.contains(&c)),
      );
      Character::from_name(&name).unwrap_or(pool[0])
   }

   pub(crate) fn request_rank(&mut self, seat: Seat, min: Rank, max: Rank, purpose: Purpose) -> Rank {
      self.request(
         seat,
         "rank",
         min,
         |s, v| s.choose_rank(v, min, max, purpose),
         |rank| *rank >= min && *rank <= max,
      )
   }

   pub(crate) fn request_player(&mut self, seat: Seat, candidates: &[Seat], purpose: Purpose) -> Option<Seat> {
      self.request(
         seat,
         "player",
         None,
         |s, v| s.choose_player(v, candidates, purpose),
         |choice| choice.map_or(true, |c| candidates.contains(&c)),
      )
   }

   pub(crate) fn request_district_index(&mut self, seat: Seat, target: Seat) -> Option<usize> {
      let city = self.players[target as usize].city.clone();
      let len = city.len();
      self.request(
         seat,
         "district",
         None,
         |s, v| s.choose_district_index(v, target, &city),
         |choice| choice.map_or(true, |i| i < len),
      )
   }

   pub(crate) fn request_discard_indices(&mut self, seat: Seat) -> Vec<usize> {
      let hand = self.players[seat as usize].hand.clone();
      let len = hand.len();
      self.request(
         seat,
         "discard",
         Vec::new(),
         |s, v| s.choose_discard_indices(v, &hand),
         |indices| indices.iter().all(|i| *i < len),
      )
   }

   pub(crate) fn request_magician_action(&mut self, seat: Seat) -> MagicianAction {
      self.ask(seat, |s, v| s.choose_magician_action(v))
   }
}

fn restore_player(ps: &PlayerSnapshot, catalog: &Catalog, config: &GameConfig) -> Result<Player, SnapshotError> {
   let mut player = Player::new(ps.id, ps.gold);
   if let Some(rank) = ps.character {
      player.assign_character(catalog.character_by_rank(rank)?);
   }
   for name in ps.hand.iter() {
      player.hand.push(catalog.district_by_name(name)?);
   }
   for name in ps.city.iter() {
      player
         .add_to_city(catalog.district_by_name(name)?)
         .map_err(|_| SnapshotError::Corrupt(format!("player {} has {} twice", ps.id, name)))?;
   }
   if player.city.len() > config.rules.completed_city + MAX_PLAYERS {
      return Err(SnapshotError::Corrupt(format!("player {} city is implausibly large", ps.id)));
   }
   Ok(player)
}

#[cfg(test)]
pub(crate) mod test {
   use super::*;
   use crate::ai::heuristic;

   pub(crate) fn district(name: &str, color: DistrictColor, cost: u32) -> DistrictCard {
      DistrictCard::new(name, color, cost, None)
   }

   pub(crate) fn ai_game(players: usize, seed: u64) -> Game {
      let sources: Vec<Box<dyn DecisionSource>> = (0..players)
         .map(|i| Box::new(heuristic::new(seed + i as u64)) as Box<dyn DecisionSource>)
         .collect();
      Game::new(
         GameConfig::with_players(players).seeded(seed),
         Catalog::classic().unwrap(),
         sources,
      )
      .unwrap()
   }

   impl Game {
      /// Hands `seat` a character and opens its turn without running the phases.
      pub(crate) fn start_test_turn(&mut self, seat: Seat, character: Character) {
         self.players[seat as usize].assign_character(character);
         self.built_this_turn.insert(seat, 0);
      }

      pub(crate) fn player_mut(&mut self, seat: Seat) -> &mut Player {
         &mut self.players[seat as usize]
      }
   }

   #[test]
   fn setup_deals_opening_hands() {
      let game = ai_game(5, 11);
      assert_eq!(game.players().len(), 5);
      for p in game.players() {
         assert_eq!(p.gold, 2);
         assert_eq!(p.hand.len(), 4);
         assert!(p.city.is_empty());
      }
      assert_eq!(game.supply().len(), 66 - 20);
      assert_eq!(game.round(), 1);
      assert_eq!(game.crowned_seat(), 0);
   }

   #[test]
   fn player_count_is_validated() {
      for n in &[3usize, 8] {
         let sources: Vec<Box<dyn DecisionSource>> = (0..*n)
            .map(|i| Box::new(heuristic::new(i as u64)) as Box<dyn DecisionSource>)
            .collect();
         match Game::new(GameConfig::with_players(*n), Catalog::classic().unwrap(), sources) {
            Err(SetupError::PlayerCount(count)) => assert_eq!(count, *n),
            _ => panic!("Expected player count error"),
         }
      }
      let sources: Vec<Box<dyn DecisionSource>> = vec![Box::new(heuristic::new(0))];
      match Game::new(GameConfig::with_players(4), Catalog::classic().unwrap(), sources) {
         Err(SetupError::SourceCount { players: 4, sources: 1 }) => (),
         _ => panic!("Expected source count error"),
      }
   }

   #[test]
   fn duplicate_build_refused_regardless_of_gold() {
      let mut game = ai_game(4, 1);
      game.start_test_turn(0, Character::Merchant);
      let temple = district("Temple", DistrictColor::Blue, 1);
      {
         let p = game.player_mut(0);
         p.gold = 50;
         p.city.push(temple.clone());
         p.hand = vec![temple.clone()];
      }
      assert_eq!(game.build_district(0, &temple), Err(Refusal::DuplicateDistrict));
      assert_eq!(game.players()[0].gold, 50);
      assert_eq!(game.players()[0].city.len(), 1);
   }

   #[test]
   fn build_spends_gold_and_respects_limit() {
      let mut game = ai_game(4, 2);
      game.start_test_turn(1, Character::King);
      let manor = district("Manor", DistrictColor::Yellow, 3);
      let tavern = district("Tavern", DistrictColor::Green, 1);
      {
         let p = game.player_mut(1);
         p.gold = 10;
         p.hand = vec![manor.clone(), tavern.clone()];
      }
      assert_eq!(game.build_district(1, &manor), Ok(()));
      assert_eq!(game.players()[1].gold, 7);
      assert_eq!(game.build_district(1, &tavern), Err(Refusal::BuildLimitReached(1)));
      assert_eq!(game.players()[1].hand, vec![tavern.clone()]);

      game.set_build_limit(1, ARCHITECT_BUILD_LIMIT);
      assert_eq!(game.build_district(1, &tavern), Ok(()));
      assert_eq!(game.built_this_turn(1), 2);
   }

   #[test]
   fn insufficient_gold_is_refused() {
      let mut game = ai_game(4, 3);
      game.start_test_turn(2, Character::Bishop);
      let palace = district("Palace", DistrictColor::Yellow, 5);
      {
         let p = game.player_mut(2);
         p.gold = 4;
         p.hand = vec![palace.clone()];
      }
      assert_eq!(
         game.build_district(2, &palace),
         Err(Refusal::InsufficientGold {
            needed: 5,
            available: 4
         })
      );
      assert_eq!(game.players()[2].hand.len(), 1);
   }

   #[test]
   fn completing_a_city_ends_the_game_and_records_first() {
      let mut game = ai_game(4, 4);
      game.start_test_turn(3, Character::Architect);
      {
         let p = game.player_mut(3);
         for i in 0..7 {
            p.city.push(district(&format!("D{}", i), DistrictColor::Red, 1));
         }
         p.gold = 5;
         p.hand = vec![district("Keep", DistrictColor::Purple, 3)];
      }
      assert!(!game.is_game_over());
      let keep = game.players()[3].hand[0].clone();
      game.build_district(3, &keep).unwrap();
      assert!(game.is_game_over());
      assert_eq!(game.first_completed(), Some(3));
      assert!(game.events().contains(&GameEvent::CityCompleted { seat: 3 }));
   }

   #[test]
   fn lowest_complete_seat_takes_the_bonus_whoever_finished_first() {
      let mut game = ai_game(4, 14);
      for seat in [3, 2].iter().cloned() {
         game.start_test_turn(seat, Character::Architect);
         {
            let p = game.player_mut(seat);
            for i in 0..7 {
               p.city.push(district(&format!("S{}D{}", seat, i), DistrictColor::Blue, 1));
            }
            p.gold = 5;
            p.hand = vec![district("Keep", DistrictColor::Purple, 3)];
         }
         let keep = game.players()[seat as usize].hand[0].clone();
         game.build_district(seat, &keep).unwrap();
         if seat == 3 {
            assert_eq!(game.first_completed(), Some(3));
         }
      }
      assert_eq!(game.first_completed(), Some(2));
      let scores = game.scores();
      assert_eq!(scores[2].completion, 4);
      assert_eq!(scores[3].completion, 2);
   }

   #[test]
   fn warlord_pays_cost_minus_one() {
      let mut game = ai_game(4, 5);
      game.player_mut(0).gold = 3;
      game.player_mut(1).city = vec![district("Castle", DistrictColor::Yellow, 4)];
      let supply_before = game.supply().len();
      assert_eq!(game.destroy_district(0, 1, 0), Ok(3));
      assert_eq!(game.players()[0].gold, 0);
      assert!(game.players()[1].city.is_empty());
      assert_eq!(game.supply().len(), supply_before + 1);

      game.player_mut(1).city = vec![district("Tavern", DistrictColor::Green, 1)];
      assert_eq!(game.destroy_district(0, 1, 0), Ok(0));
   }

   #[test]
   fn warlord_cannot_touch_protected_or_completed_cities() {
      let mut game = ai_game(4, 6);
      game.player_mut(0).gold = 10;
      game.player_mut(1).city = vec![district("Castle", DistrictColor::Yellow, 4)];
      game.set_bishop_protection(1, true);
      assert_eq!(game.destroy_district(0, 1, 0), Err(Refusal::ProtectedTarget(1)));
      assert_eq!(game.players()[0].gold, 10);

      for i in 0..8 {
         game.player_mut(2).city.push(district(&format!("C{}", i), DistrictColor::Red, 2));
      }
      assert_eq!(game.destroy_district(0, 2, 0), Err(Refusal::CompletedCity(2)));
      assert_eq!(game.players()[2].city.len(), 8);
      assert_eq!(game.players()[0].gold, 10);

      game.player_mut(3).city = vec![district("Fortress", DistrictColor::Red, 5)];
      game.player_mut(0).gold = 3;
      assert_eq!(
         game.destroy_district(0, 3, 0),
         Err(Refusal::InsufficientGold {
            needed: 4,
            available: 3
         })
      );
      assert_eq!(game.destroy_district(0, 3, 4), Err(Refusal::NoSuchDistrict));
   }

   #[test]
   fn library_keeps_both_cards() {
      let mut game = ai_game(4, 7);
      game.player_mut(0).city = vec![DistrictCard::new("Library", DistrictColor::Purple, 6, None)];
      let before = game.players()[0].hand.len();
      let supply_before = game.supply().len();
      game.draw_two_choose(0);
      assert_eq!(game.players()[0].hand.len(), before + 2);
      assert_eq!(game.supply().len(), supply_before - 2);
   }

   #[test]
   fn drawing_two_keeps_one_and_returns_the_other() {
      let mut game = ai_game(4, 8);
      let before = game.players()[1].hand.len();
      let supply_before = game.supply().len();
      game.draw_two_choose(1);
      assert_eq!(game.players()[1].hand.len(), before + 1);
      assert_eq!(game.supply().len(), supply_before - 1);
   }

   #[test]
   fn rank_ranges_are_enforced() {
      let mut game = ai_game(4, 9);
      assert_eq!(game.kill_rank(0, 1), Err(Refusal::RankOutOfRange));
      assert_eq!(game.kill_rank(0, 9), Err(Refusal::RankOutOfRange));
      assert_eq!(game.set_rob_target(1, 2), Err(Refusal::RankOutOfRange));
      assert!(game.kill_rank(0, 8).is_ok());
      assert!(game.set_rob_target(1, 3).is_ok());
      assert_eq!(game.robbery(), Some(Robbery { rank: 3, thief: 1 }));
   }

   #[test]
   fn swap_and_redraw_keep_card_counts() {
      let mut game = ai_game(4, 10);
      game.player_mut(2).hand.truncate(1);
      let hand0 = game.players()[0].hand.clone();
      let hand2 = game.players()[2].hand.clone();
      game.swap_hands(0, 2).unwrap();
      assert_eq!(game.players()[0].hand, hand2);
      assert_eq!(game.players()[2].hand, hand0);
      assert_eq!(game.swap_hands(0, 0), Err(Refusal::NoSuchSeat));

      let supply_before = game.supply().len();
      let total_before = supply_before + game.players()[2].hand.len();
      assert_eq!(game.discard_and_redraw(2, &[0, 2, 2]), Ok(2));
      assert_eq!(game.players()[2].hand.len(), 4);
      assert_eq!(game.supply().len() + game.players()[2].hand.len(), total_before);
      assert_eq!(game.discard_and_redraw(2, &[9]), Err(Refusal::NotInHand));
   }

   #[test]
   fn income_counts_wildcard_by_rule() {
      let mut game = ai_game(4, 12);
      game.player_mut(0).city = vec![
         district("Watchtower", DistrictColor::Red, 1),
         DistrictCard::new("School of Magic", DistrictColor::Purple, 6, None),
      ];
      assert_eq!(game.gain_income(0, DistrictColor::Red, 0), 2);
      assert_eq!(game.gain_income(0, DistrictColor::Green, 1), 2);
      assert_eq!(game.players()[0].gold, 6);
   }
}
