// A person at the terminal. Prompts loop until the answer parses.
use citadels::{
   Catalog, Character, DecisionSource, DistrictCard, GameEvent, GameView, KeptCard, MagicianAction, Purpose, Rank,
   ResourceChoice, Seat,
};
use std::io::{self, Write};

const HELP: &str = "\
Answer prompts with the number shown (or a name where asked).
While a prompt is open you can also type:
  hand          show your hand
  city          show your city
  gold          show your gold
  info <card>   describe a district or character
  help          show this message";

pub struct ConsoleSource {
   catalog: Catalog,
   eof: bool,
}

pub fn new(catalog: Catalog) -> ConsoleSource {
   ConsoleSource { catalog, eof: false }
}

/// Reads one trimmed line from stdin, `None` once input is closed.
pub fn read_line() -> Option<String> {
   let _ = io::stdout().flush();
   let mut line = String::new();
   match io::stdin().read_line(&mut line) {
      Ok(0) | Err(_) => None,
      Ok(_) => Some(line.trim().to_string()),
   }
}

fn print_cards(title: &str, cards: &[DistrictCard]) {
   if cards.is_empty() {
      println!("{}: (empty)", title);
      return;
   }
   println!("{}:", title);
   for (i, card) in cards.iter().enumerate() {
      println!("  {}. {}", i + 1, card);
   }
}

impl ConsoleSource {
   fn prompt(&mut self, view: &GameView, question: &str) -> Option<String> {
      loop {
         if self.eof {
            return None;
         }
         print!("{} > ", question);
         let line = match read_line() {
            Some(line) => line,
            None => {
               warn!("Input closed; answering the remaining prompts with defaults");
               self.eof = true;
               return None;
            }
         };
         if !self.answer_info(view, &line) {
            return Some(line);
         }
      }
   }

   /// Handles the information commands. Returns false when `line` is an actual answer.
   fn answer_info(&self, view: &GameView, line: &str) -> bool {
      let mut words = line.splitn(2, ' ');
      match (words.next(), words.next().map(str::trim)) {
         (Some("hand"), None) => print_cards("Your hand", &view.me().hand),
         (Some("city"), None) => print_cards("Your city", &view.me().city),
         (Some("gold"), None) => println!("You have {} gold.", view.me().gold),
         (Some("help"), _) => println!("{}", HELP),
         (Some("info"), Some(name)) => {
            if let Some(d) = self.catalog.find_district(name) {
               println!("{}: {}", d, d.text().unwrap_or("no special ability"));
            } else if let Some(c) = Character::from_name(name) {
               println!("{} ({}): {}", c, c.rank(), c.summary());
            } else {
               println!("No card called '{}'.", name);
            }
         }
         _ => return false,
      }
      true
   }

   /// A number in `min..=max`. An empty line counts as 0 when `min` is 0.
   fn prompt_number(&mut self, view: &GameView, question: &str, min: usize, max: usize) -> Option<usize> {
      loop {
         let line = self.prompt(view, question)?;
         if line.is_empty() && min == 0 {
            return Some(0);
         }
         match line.parse::<usize>() {
            Ok(n) if n >= min && n <= max => return Some(n),
            _ => println!("Please enter a number from {} to {}.", min, max),
         }
      }
   }
}

impl DecisionSource for ConsoleSource {
   fn strategy_name(&self) -> &'static str {
      "Human"
   }

   fn is_computer(&self) -> bool {
      false
   }

   fn choose_character(&mut self, view: &GameView, available: &[Character]) -> String {
      println!("Available characters:");
      for (i, c) in available.iter().enumerate() {
         println!("  {}. {} ({}) - {}", i + 1, c, c.rank(), c.summary());
      }
      loop {
         let line = match self.prompt(view, "Choose a character") {
            Some(line) => line,
            None => return available[0].name().to_string(),
         };
         if let Ok(n) = line.parse::<usize>() {
            if n >= 1 && n <= available.len() {
               return available[n - 1].name().to_string();
            }
         }
         match Character::from_name(&line) {
            Some(c) if available.contains(&c) => return c.name().to_string(),
            _ => println!("That character is not available."),
         }
      }
   }

   fn choose_rank(&mut self, view: &GameView, min: Rank, max: Rank, purpose: Purpose) -> Rank {
      let verb = match purpose {
         Purpose::Kill => "kill",
         Purpose::Rob => "rob",
         _ => "target",
      };
      for rank in min..=max {
         if let Some(c) = Character::from_rank(rank) {
            println!("  {}. {}", rank, c);
         }
      }
      let question = format!("Which character will you {}", verb);
      self
         .prompt_number(view, &question, min as usize, max as usize)
         .map_or(min, |n| n as Rank)
   }

   fn choose_player(&mut self, view: &GameView, candidates: &[Seat], purpose: Purpose) -> Option<Seat> {
      for seat in candidates.iter() {
         let p = &view.players[*seat as usize];
         println!(
            "  {}. Player {} ({} gold, {} cards in hand, {} districts)",
            seat + 1,
            seat + 1,
            p.gold,
            p.hand.len(),
            p.city.len()
         );
      }
      let question = match purpose {
         Purpose::MagicianSwap => "Swap hands with which player (Enter to skip)",
         Purpose::WarlordDestroy => "Attack which player's city (Enter to skip)",
         _ => "Choose a player (Enter to skip)",
      };
      loop {
         let n = self.prompt_number(view, question, 0, view.players.len())?;
         if n == 0 {
            return None;
         }
         let seat = (n - 1) as Seat;
         if candidates.contains(&seat) {
            return Some(seat);
         }
         println!("Player {} cannot be chosen.", n);
      }
   }

   fn choose_district_index(&mut self, view: &GameView, target: Seat, city: &[DistrictCard]) -> Option<usize> {
      println!("You have {} gold. Destroying costs one less than the district.", view.me().gold);
      print_cards(&format!("Player {}'s city", target + 1), city);
      match self.prompt_number(view, "Destroy which district (Enter to skip)", 0, city.len()) {
         Some(0) | None => None,
         Some(n) => Some(n - 1),
      }
   }

   fn choose_discard_indices(&mut self, view: &GameView, hand: &[DistrictCard]) -> Vec<usize> {
      print_cards("Your hand", hand);
      loop {
         let line = match self.prompt(view, "Cards to discard, separated by spaces (Enter for none)") {
            Some(line) => line,
            None => return Vec::new(),
         };
         let picked: Result<Vec<usize>, _> = line.split_whitespace().map(|w| w.parse::<usize>()).collect();
         match picked {
            Ok(ref nums) if nums.iter().all(|n| *n >= 1 && *n <= hand.len()) => {
               return nums.iter().map(|n| n - 1).collect();
            }
            _ => println!("Please list card numbers from 1 to {}.", hand.len()),
         }
      }
   }

   fn choose_kept_card(&mut self, view: &GameView, first: &DistrictCard, second: &DistrictCard) -> KeptCard {
      println!("You drew:");
      println!("  1. {}", first);
      println!("  2. {}", second);
      match self.prompt_number(view, "Keep which card", 1, 2) {
         Some(2) => KeptCard::Second,
         _ => KeptCard::First,
      }
   }

   fn choose_resource(&mut self, view: &GameView) -> ResourceChoice {
      println!("  1. Take 2 gold");
      println!("  2. Draw 2 districts and keep one");
      loop {
         let line = match self.prompt(view, "Gold or cards") {
            Some(line) => line,
            None => return ResourceChoice::Gold,
         };
         match line.to_lowercase().as_str() {
            "1" | "gold" => return ResourceChoice::Gold,
            "2" | "cards" | "draw" => return ResourceChoice::Cards,
            _ => println!("Please answer 1 (gold) or 2 (cards)."),
         }
      }
   }

   fn choose_build(&mut self, view: &GameView) -> Option<usize> {
      let me = view.me();
      if me.buildable().next().is_none() {
         println!("You cannot afford to build anything new ({} gold).", me.gold);
         return None;
      }
      println!("You have {} gold.", me.gold);
      print_cards("Your hand", &me.hand);
      match self.prompt_number(view, "Build which district (Enter to stop)", 0, me.hand.len()) {
         Some(0) | None => None,
         Some(n) => Some(n - 1),
      }
   }

   fn choose_magician_action(&mut self, view: &GameView) -> MagicianAction {
      println!("  1. Swap hands with another player");
      println!("  2. Discard cards and draw replacements");
      println!("  3. Do nothing");
      match self.prompt_number(view, "Magician", 1, 3) {
         Some(1) => MagicianAction::Swap,
         Some(2) => MagicianAction::Redraw,
         _ => MagicianAction::Pass,
      }
   }

   fn on_event(&mut self, event: &GameEvent) {
      println!("{}", event);
   }
}
