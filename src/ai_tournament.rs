use citadels::ai;
use citadels::{Catalog, DecisionSource, Game, GameConfig, SetupError};
use std::fmt::{self, Display};

const SEATS: usize = 4;
const ROUND_LIMIT: u32 = 100;

#[derive(Copy, Clone, Debug, PartialEq)]
enum Ai {
   Heuristic,
   Random,
}

impl Ai {
   fn instantiate(self, seed: u64) -> Box<dyn DecisionSource> {
      match self {
         Ai::Heuristic => Box::new(ai::heuristic::new(seed)),
         Ai::Random => Box::new(ai::random::new(seed)),
      }
   }
}

impl Display for Ai {
   fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
      let s = match self {
         Ai::Heuristic => "Heuristic",
         Ai::Random => "Random",
      };
      write!(f, "{}", s)
   }
}

const AI_ARRAY: [Ai; 2] = [Ai::Heuristic, Ai::Random];

#[derive(PartialEq)]
enum Winner {
   First,
   Second,
   Shared,
   TimedOut,
}

struct GameResult {
   winner: Winner,
   num_rounds: u32,
}

/// Seats alternate between the two strategies, `first` at seat 0.
fn run_ai_game(first: Ai, second: Ai, catalog: &Catalog, seed: u64) -> Result<GameResult, SetupError> {
   let lineup: Vec<Ai> = (0..SEATS).map(|i| if i % 2 == 0 { first } else { second }).collect();
   let sources = lineup
      .iter()
      .enumerate()
      .map(|(i, ai)| ai.instantiate(seed.wrapping_mul(31).wrapping_add(i as u64)))
      .collect();
   let mut game = Game::new(GameConfig::with_players(SEATS).seeded(seed), catalog.clone(), sources)?;

   while !game.is_game_over() {
      if game.round() > ROUND_LIMIT {
         return Ok(GameResult {
            winner: Winner::TimedOut,
            num_rounds: ROUND_LIMIT,
         });
      }
      game.play_round();
      game.drain_events();
   }

   let num_rounds = game.round() - 1;
   let winners = game.winners();
   let first_won = winners.iter().any(|s| lineup[*s as usize] == first);
   let second_won = winners.iter().any(|s| lineup[*s as usize] == second);
   let winner = match (first_won, second_won) {
      (true, false) => Winner::First,
      (false, true) => Winner::Second,
      _ => Winner::Shared,
   };
   Ok(GameResult { winner, num_rounds })
}

pub fn go(num_games: usize, catalog: &Catalog, seed: u64) -> Result<(), SetupError> {
   for i in 0..AI_ARRAY.len() {
      for j in i + 1..AI_ARRAY.len() {
         let mut i_wins: usize = 0;
         let mut j_wins: usize = 0;
         let mut draws: usize = 0;
         let mut total_rounds: u64 = 0;
         println!("{} vs. {}", AI_ARRAY[i], AI_ARRAY[j]);
         for g in 0..num_games {
            let game_seed = seed.wrapping_add(g as u64);
            // Swap who sits first for half the games.
            let result = if g % 2 == 0 {
               run_ai_game(AI_ARRAY[i], AI_ARRAY[j], catalog, game_seed)?
            } else {
               run_ai_game(AI_ARRAY[j], AI_ARRAY[i], catalog, game_seed)?
            };
            let i_first = g % 2 == 0;
            match result.winner {
               Winner::First if i_first => i_wins += 1,
               Winner::First => j_wins += 1,
               Winner::Second if i_first => j_wins += 1,
               Winner::Second => i_wins += 1,
               Winner::Shared | Winner::TimedOut => draws += 1,
            }
            if result.winner == Winner::TimedOut {
               warn!("Game {} hit the {} round limit", g, ROUND_LIMIT);
            }
            total_rounds += u64::from(result.num_rounds);
         }
         let games = num_games.max(1) as f64;
         println!(
            "{}: {} wins ({:.2}%) // {}: {} ({:.2}%) || {} draws || avg. game length: {:.2} rounds",
            AI_ARRAY[i],
            i_wins,
            100.0 * i_wins as f64 / games,
            AI_ARRAY[j],
            j_wins,
            100.0 * j_wins as f64 / games,
            draws,
            total_rounds as f64 / games
         )
      }
   }
   Ok(())
}
