#[macro_use]
extern crate log;
extern crate citadels;
extern crate clap;
extern crate pretty_env_logger;
extern crate rand;

mod ai_tournament;
mod console;

use citadels::ai::{self, DecisionSource};
use citadels::{Catalog, Game, GameConfig, ScoreLine, Snapshot};
use clap::Parser;
use log::LevelFilter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::error::Error;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "citadels", about = "Play Citadels against computer opponents")]
struct Args {
   /// Number of seats, including yours
   #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(4..=7))]
   players: u8,
   /// Seed for shuffling and computer players
   #[arg(long)]
   seed: Option<u64>,
   /// Resume a game saved with `save <file>`
   #[arg(long)]
   load: Option<PathBuf>,
   /// Play this many computer-only games per pairing of strategies and report win rates
   #[arg(long)]
   tournament: Option<usize>,
   /// District list to use instead of the classic deck
   #[arg(long)]
   catalog: Option<PathBuf>,
   #[arg(short, long)]
   verbose: bool,
   /// Show computer hands after every round
   #[arg(long)]
   debug: bool,
}

fn init_logging(verbose: bool) {
   let mut builder = pretty_env_logger::formatted_builder();
   match std::env::var("RUST_LOG") {
      Ok(filters) => {
         builder.parse_filters(&filters);
      }
      Err(_) => {
         builder.filter_level(if verbose { LevelFilter::Debug } else { LevelFilter::Warn });
      }
   }
   builder.init();
}

fn seat_sources(players: usize, catalog: &Catalog, seed: u64) -> Vec<Box<dyn DecisionSource>> {
   let mut sources: Vec<Box<dyn DecisionSource>> = vec![Box::new(console::new(catalog.clone()))];
   for seat in 1..players {
      sources.push(Box::new(ai::heuristic::new(seed.wrapping_add(seat as u64))));
   }
   sources
}

fn print_table(game: &Game, names: &[String]) {
   for p in game.players() {
      let who = if p.id == 0 { "You".to_string() } else { names[p.id as usize - 1].clone() };
      println!(
         "Player {} ({}, {}): {} gold, {} cards, city [{}]",
         p.id + 1,
         who,
         game.strategy_name(p.id),
         p.gold,
         p.hand.len(),
         p.city.iter().map(|d| d.name()).collect::<Vec<_>>().join(", ")
      );
   }
}

fn print_computer_hands(game: &Game) {
   for p in game.players().iter().filter(|p| p.id != 0) {
      let hand: Vec<String> = p.hand.iter().map(|d| d.to_string()).collect();
      println!("[debug] Player {} hand: {}", p.id + 1, hand.join(", "));
   }
}

fn print_breakdown(scores: &[ScoreLine]) {
   for line in scores {
      println!(
         "Player {}: {} (districts {}, colours {}, completion {}, unique {})",
         line.seat + 1,
         line.total,
         line.base,
         line.diversity,
         line.completion,
         line.unique
      );
   }
}

/// Waits for Enter between rounds. Returns false when the player wants to stop.
fn between_rounds(game: &Game) -> bool {
   loop {
      print!("[Enter] next round, `save <file>`, or `quit` > ");
      let line = match console::read_line() {
         Some(line) => line,
         None => return true,
      };
      let mut words = line.splitn(2, ' ');
      match (words.next(), words.next()) {
         (Some(""), None) => return true,
         (Some("quit"), None) => return false,
         (Some("save"), Some(path)) => match save(game, path.trim()) {
            Ok(()) => println!("Saved to {}.", path.trim()),
            Err(e) => {
               error!("Could not save to {}: {}", path, e);
               println!("Could not save: {}", e);
            }
         },
         _ => println!("Unknown command '{}'.", line),
      }
   }
}

fn save(game: &Game, path: &str) -> Result<(), Box<dyn Error>> {
   let json = game.snapshot().to_json()?;
   fs::write(path, json)?;
   info!("Wrote snapshot for round {} to {}", game.round(), path);
   Ok(())
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
   let catalog = match args.catalog {
      Some(ref path) => Catalog::from_file(path)?,
      None => Catalog::classic()?,
   };
   let seed = args.seed.unwrap_or_else(|| StdRng::from_entropy().gen());
   debug!("Using seed {}", seed);

   if let Some(games) = args.tournament {
      ai_tournament::go(games, &catalog, seed)?;
      return Ok(());
   }

   let mut game = match args.load {
      Some(ref path) => {
         let snapshot = Snapshot::from_json(&fs::read_to_string(path)?)?;
         let players = snapshot.players.len();
         let config = GameConfig::with_players(players).seeded(seed);
         Game::restore(&snapshot, config, catalog.clone(), seat_sources(players, &catalog, seed))?
      }
      None => {
         let players = args.players as usize;
         let config = GameConfig::with_players(players).seeded(seed);
         Game::new(config, catalog.clone(), seat_sources(players, &catalog, seed))?
      }
   };

   let names = ai::bot_names(game.players().len() - 1, &mut StdRng::seed_from_u64(seed));
   println!("Welcome to Citadels! Type `help` at any prompt.");
   print_table(&game, &names);

   while !game.is_game_over() {
      game.play_round();
      game.drain_events();
      println!();
      print_table(&game, &names);
      if args.debug {
         print_computer_hands(&game);
      }
      if !game.is_game_over() && !between_rounds(&game) {
         println!("Goodbye.");
         return Ok(());
      }
   }

   let scores = game.announce_results();
   print_breakdown(&scores);
   Ok(())
}

fn main() {
   let args = Args::parse();
   init_logging(args.verbose);
   if let Err(e) = run(args) {
      error!("{}", e);
      eprintln!("Error: {}", e);
      std::process::exit(1);
   }
}
