//! Round engine: every session transition the HTTP handlers can trigger.
//!
//! This includes:
//!   - Starting a round (species pick without repeats, best-effort artwork)
//!   - Evaluating a guess (validation, duplicates, reveal, win/loss accounting)
//!   - Difficulty change, restart and full reset
//!   - Rendering the current session as a view model
//!
//! The engine never touches storage; callers hand in the session and persist it afterwards.
//! Randomness is injected so tests can pin the species and the Nidoran gender.

use rand::{seq::SliceRandom, Rng};
use tracing::{debug, info, instrument};

use crate::domain::{AlertKind, Difficulty, ImageVisibility, Round, SessionState};
use crate::error::GameError;
use crate::protocol::{CompletionView, GameView, LobbyView, RoundView, COMPLETE_TITLE, TITLE};
use crate::util::{fold_letter, trunc_for_log, upper_letter};
use crate::wordbank::WordBank;

/// What a single guess did to the round.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Outcome {
  Invalid,
  Duplicate(char),
  Correct(char),
  Incorrect(char),
  Won(String),
  Lost(String),
}

impl Outcome {
  fn message(&self, attempts_left: u32) -> String {
    match self {
      Outcome::Invalid => "Please enter a single letter, a-z.".into(),
      Outcome::Duplicate(c) => format!("You already guessed '{}'.", upper_letter(*c)),
      Outcome::Correct(c) => format!(
        "Correct! '{}' is in the name. You have {} attempts left.",
        upper_letter(*c),
        attempts_left
      ),
      Outcome::Incorrect(c) => format!(
        "Incorrect! '{}' is not in the name. You have {} attempts left.",
        upper_letter(*c),
        attempts_left
      ),
      Outcome::Won(name) => format!("Congratulations! You guessed the Pokémon: {}.", name),
      Outcome::Lost(name) => format!("Game over! The Pokémon was: {}.", name),
    }
  }

  fn alert(&self) -> AlertKind {
    match self {
      Outcome::Invalid => AlertKind::Info,
      Outcome::Duplicate(_) => AlertKind::Warning,
      Outcome::Correct(_) | Outcome::Won(_) => AlertKind::Success,
      Outcome::Incorrect(_) | Outcome::Lost(_) => AlertKind::Danger,
    }
  }
}

/// Pick a species not yet seen this campaign and open a fresh round for it.
/// When every name has been encountered the campaign-complete view is returned instead.
#[instrument(level = "info", skip_all, fields(difficulty = difficulty.as_str()))]
pub async fn start_round<R: Rng + Send>(
  session: &mut SessionState,
  difficulty: Difficulty,
  bank: &dyn WordBank,
  rng: &mut R,
) -> GameView {
  session.difficulty = difficulty;
  let max_attempts = difficulty.max_attempts();

  let names = bank.list_names();
  let picked = names
    .iter()
    .filter(|n| !session.encountered_names.contains(*n))
    .collect::<Vec<_>>()
    .choose(rng)
    .map(|n| n.to_string());

  let Some(name) = picked else {
    session.active_round = None;
    info!(target: "hangman", caught = session.caught_names.len(), total = names.len(), "Campaign complete");
    return GameView::CampaignComplete(CompletionView {
      title: COMPLETE_TITLE.into(),
      caught_pokemon: session.caught_names.len(),
      total_pokemon: names.len(),
      rounds_won: session.rounds_won,
      rounds_lost: session.rounds_lost,
    });
  };

  let image_ref = bank.resolve_image(&name, rng).await;
  session.active_round = Some(Round::new(&name, max_attempts, image_ref));
  session.encountered_names.insert(name.clone());
  info!(target: "hangman", %name, max_attempts, progress = session.encountered_names.len(), "Round started");

  round_view(session, String::new(), AlertKind::Info)
}

/// `start_round`, unless a round of the same difficulty is still in play; that one is resumed.
#[instrument(level = "debug", skip_all)]
pub async fn resume_or_start<R: Rng + Send>(
  session: &mut SessionState,
  difficulty: Difficulty,
  bank: &dyn WordBank,
  rng: &mut R,
) -> GameView {
  let in_play = session.active_round.as_ref().is_some_and(|r| r.is_active);
  if in_play && session.difficulty == difficulty {
    debug!(target: "hangman", "Resuming active round");
    return current_view(session);
  }
  start_round(session, difficulty, bank, rng).await
}

/// Apply one guess to the active round.
///
/// Bad input and repeated letters only produce a message. A new letter is recorded and
/// either reveals cells or costs an attempt; afterwards a solved mask wins the round,
/// which takes priority over running out of attempts.
#[instrument(level = "info", skip(session, raw_input), fields(input = %trunc_for_log(raw_input, 8)))]
pub fn submit_guess(session: &mut SessionState, raw_input: &str) -> Result<GameView, GameError> {
  let round = match session.active_round.as_mut() {
    Some(r) if r.is_active => r,
    _ => return Err(GameError::NoActiveRound),
  };

  let normalized = raw_input.to_lowercase();
  let mut chars = normalized.chars();
  let letter = match (chars.next(), chars.next()) {
    (Some(c), None) if c.is_alphabetic() => fold_letter(c),
    _ => {
      let outcome = Outcome::Invalid;
      let msg = outcome.message(round.attempts_left);
      return Ok(round_view(session, msg, outcome.alert()));
    }
  };

  let mut outcome = if round.has_guessed(letter) {
    Outcome::Duplicate(letter)
  } else {
    round.guessed_letters.push(letter);
    if round.reveal(letter) > 0 {
      Outcome::Correct(letter)
    } else {
      round.attempts_left = round.attempts_left.saturating_sub(1);
      Outcome::Incorrect(letter)
    }
  };

  if matches!(outcome, Outcome::Correct(_) | Outcome::Incorrect(_)) {
    if round.is_solved() {
      let name = round.capitalized_name();
      round.is_active = false;
      session.rounds_won += 1;
      session.caught_names.insert(name.clone());
      info!(target: "hangman", %name, rounds_won = session.rounds_won, "Round won");
      outcome = Outcome::Won(name);
    } else if round.attempts_left == 0 {
      let name = round.capitalized_name();
      round.is_active = false;
      session.rounds_lost += 1;
      info!(target: "hangman", %name, rounds_lost = session.rounds_lost, "Round lost");
      outcome = Outcome::Lost(name);
    }
  }

  let msg = outcome.message(round.attempts_left);
  debug!(target: "hangman", ?outcome, attempts_left = round.attempts_left, "Guess evaluated");
  Ok(round_view(session, msg, outcome.alert()))
}

/// New difficulty starts a new campaign; lifetime stats (wins, losses, collection) carry over.
#[instrument(level = "info", skip_all, fields(difficulty = new_difficulty.as_str()))]
pub fn change_difficulty(session: &mut SessionState, new_difficulty: Difficulty) -> GameView {
  session.active_round = None;
  session.encountered_names.clear();
  session.difficulty = new_difficulty;
  lobby_view(session)
}

/// Same difficulty, fresh campaign and counters; the collection is kept.
/// Callers follow up with `start_round`.
#[instrument(level = "info", skip(session))]
pub fn restart(session: &mut SessionState) {
  session.active_round = None;
  session.encountered_names.clear();
  session.rounds_won = 0;
  session.rounds_lost = 0;
}

/// Forget everything, including caught names.
#[instrument(level = "info", skip(session))]
pub fn reset(session: &mut SessionState) -> GameView {
  *session = SessionState::default();
  lobby_view(session)
}

/// Render without mutating: the round in play (or just finished), else the lobby.
#[instrument(level = "debug", skip_all)]
pub fn current_view(session: &SessionState) -> GameView {
  round_view(session, String::new(), AlertKind::Info)
}

fn lobby_view(session: &SessionState) -> GameView {
  GameView::Lobby(LobbyView {
    title: TITLE.into(),
    rounds_won: session.rounds_won,
    rounds_lost: session.rounds_lost,
    caught: session.caught_names.len(),
    difficulty: session.difficulty,
  })
}

fn round_view(session: &SessionState, message: String, alert_type: AlertKind) -> GameView {
  let Some(round) = &session.active_round else {
    return lobby_view(session);
  };
  let round_complete = round.is_complete();
  GameView::Round(RoundView {
    title: TITLE.into(),
    rounds_won: session.rounds_won,
    rounds_lost: session.rounds_lost,
    difficulty: session.difficulty,
    progress: session.encountered_names.len(),
    image_ref: round.image_ref.clone(),
    image_class: ImageVisibility::for_round(session.difficulty, round_complete),
    round_complete,
    active: round.is_active,
    word: if round_complete { round.capitalized_name() } else { round.masked_word() },
    guessed_letters: round.guessed_display(),
    attempts_left: round.attempts_left,
    message,
    alert_type,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use async_trait::async_trait;
  use rand::{rngs::StdRng, RngCore, SeedableRng};
  use std::collections::HashSet;
  use std::sync::atomic::{AtomicUsize, Ordering};

  struct FixedBank {
    names: Vec<String>,
    image: Option<String>,
    lookups: AtomicUsize,
  }

  impl FixedBank {
    fn new(names: &[&str]) -> Self {
      Self {
        names: names.iter().map(|s| s.to_string()).collect(),
        image: Some("/static/pokemon_images/x.png".into()),
        lookups: AtomicUsize::new(0),
      }
    }
  }

  #[async_trait]
  impl WordBank for FixedBank {
    fn list_names(&self) -> &[String] {
      &self.names
    }
    async fn resolve_image(&self, _name: &str, _rng: &mut (dyn RngCore + Send)) -> Option<String> {
      self.lookups.fetch_add(1, Ordering::SeqCst);
      self.image.clone()
    }
  }

  fn rng() -> StdRng {
    StdRng::seed_from_u64(42)
  }

  fn round_of(view: &GameView) -> &RoundView {
    match view {
      GameView::Round(r) => r,
      other => panic!("expected round view, got {other:?}"),
    }
  }

  async fn session_with(name: &str, difficulty: Difficulty) -> SessionState {
    let bank = FixedBank::new(&[name]);
    let mut s = SessionState::default();
    start_round(&mut s, difficulty, &bank, &mut rng()).await;
    s
  }

  fn guess(s: &mut SessionState, g: &str) -> RoundView {
    round_of(&submit_guess(s, g).expect("active round")).clone()
  }

  #[tokio::test]
  async fn fresh_round_is_fully_masked() {
    let bank = FixedBank::new(&["Pikachu"]);
    let mut s = SessionState::default();
    let view = start_round(&mut s, Difficulty::Easy, &bank, &mut rng()).await;
    let v = round_of(&view);
    assert_eq!(v.word, "_ _ _ _ _ _ _");
    assert_eq!(v.attempts_left, 10);
    assert_eq!(v.guessed_letters, "");
    assert!(v.active && !v.round_complete);
    assert_eq!(v.image_class, ImageVisibility::Visible);
    assert_eq!(v.progress, 1);
    assert_eq!(bank.lookups.load(Ordering::SeqCst), 1);
    assert!(s.encountered_names.contains("Pikachu"));
  }

  #[tokio::test]
  async fn pikachu_on_easy() {
    let mut s = session_with("Pikachu", Difficulty::Easy).await;

    let v = guess(&mut s, "p");
    assert_eq!(v.word, "P _ _ _ _ _ _");
    assert_eq!(v.attempts_left, 10);
    assert_eq!(v.alert_type, AlertKind::Success);
    assert_eq!(v.message, "Correct! 'P' is in the name. You have 10 attempts left.");

    guess(&mut s, "i");
    guess(&mut s, "K");
    let v = guess(&mut s, "x");
    assert_eq!(v.attempts_left, 9);
    assert_eq!(v.alert_type, AlertKind::Danger);
    assert_eq!(v.message, "Incorrect! 'X' is not in the name. You have 9 attempts left.");
    let v = guess(&mut s, "y");
    assert_eq!(v.attempts_left, 8);
    assert_eq!(v.word, "P i k _ _ _ _");
    assert_eq!(v.guessed_letters, "p, i, k, x, y");

    for g in ["a", "c", "h"] {
      assert!(guess(&mut s, g).active);
    }
    let v = guess(&mut s, "u");
    assert!(!v.active && v.round_complete);
    assert_eq!(v.word, "Pikachu");
    assert_eq!(v.alert_type, AlertKind::Success);
    assert_eq!(v.message, "Congratulations! You guessed the Pokémon: Pikachu.");
    assert_eq!(s.rounds_won, 1);
    assert!(s.caught_names.contains("Pikachu"));
  }

  #[tokio::test]
  async fn eevee_on_extreme_is_lost_in_one() {
    let mut s = session_with("Eevee", Difficulty::Extreme).await;
    let v = guess(&mut s, "z");
    assert_eq!(v.attempts_left, 0);
    assert!(!v.active && v.round_complete);
    assert_eq!(v.word, "Eevee");
    assert_eq!(v.message, "Game over! The Pokémon was: Eevee.");
    assert_eq!(v.alert_type, AlertKind::Danger);
    assert_eq!(v.image_class, ImageVisibility::Visible);
    assert_eq!(s.rounds_lost, 1);
    assert!(s.caught_names.is_empty());
  }

  #[tokio::test]
  async fn duplicate_guess_changes_nothing() {
    let mut s = session_with("Pikachu", Difficulty::Medium).await;
    let first = guess(&mut s, "a");
    assert_eq!(first.alert_type, AlertKind::Success);
    let second = guess(&mut s, "A");
    assert_eq!(second.alert_type, AlertKind::Warning);
    assert_eq!(second.message, "You already guessed 'A'.");
    assert_eq!(second.word, first.word);
    assert_eq!(second.attempts_left, first.attempts_left);
    assert_eq!(second.guessed_letters, "a");
  }

  #[tokio::test]
  async fn invalid_input_is_info_only() {
    let mut s = session_with("Pikachu", Difficulty::Hard).await;
    for bad in ["", "ab", "1", "-", " ", "p "] {
      let v = guess(&mut s, bad);
      assert_eq!(v.alert_type, AlertKind::Info, "input {bad:?}");
      assert_eq!(v.message, "Please enter a single letter, a-z.");
      assert_eq!(v.attempts_left, 3);
      assert_eq!(v.guessed_letters, "");
      assert!(v.active);
    }
    assert_eq!(v_image_class(&s), ImageVisibility::Hidden);
  }

  fn v_image_class(s: &SessionState) -> ImageVisibility {
    round_of(&current_view(s)).image_class
  }

  #[tokio::test]
  async fn win_beats_loss_on_the_last_attempt() {
    let mut s = session_with("Mew", Difficulty::Extreme).await;
    guess(&mut s, "m");
    guess(&mut s, "e");
    let v = guess(&mut s, "w");
    assert_eq!(v.attempts_left, 1);
    assert_eq!(v.word, "Mew");
    assert_eq!(s.rounds_won, 1);
    assert_eq!(s.rounds_lost, 0);
  }

  #[tokio::test]
  async fn finished_round_rejects_guesses_without_mutation() {
    let mut s = session_with("Eevee", Difficulty::Extreme).await;
    guess(&mut s, "q");
    let before = s.active_round.clone().unwrap();
    assert_eq!(submit_guess(&mut s, "e"), Err(GameError::NoActiveRound));
    assert_eq!(submit_guess(&mut s, "??"), Err(GameError::NoActiveRound));
    let after = s.active_round.clone().unwrap();
    assert_eq!(before.attempts_left, after.attempts_left);
    assert_eq!(before.guessed_letters, after.guessed_letters);
    assert_eq!(before.reveal_mask, after.reveal_mask);
    assert_eq!(s.rounds_lost, 1);
  }

  #[test]
  fn guess_without_round_is_caller_error() {
    let mut s = SessionState::default();
    assert_eq!(submit_guess(&mut s, "a"), Err(GameError::NoActiveRound));
    assert!(s.active_round.is_none());
  }

  #[tokio::test]
  async fn separators_and_accents() {
    let mut s = session_with("Ho-Oh", Difficulty::Medium).await;
    assert_eq!(round_of(&current_view(&s)).word, "_ _ - _ _");
    let v = guess(&mut s, "o");
    assert_eq!(v.word, "_ o - o _");
    let v = guess(&mut s, "h");
    assert!(v.round_complete);
    assert_eq!(v.word, "Ho-oh");
    assert_eq!(s.caught_names.iter().collect::<Vec<_>>(), ["Ho-oh"]);

    let mut s = session_with("Flabébé", Difficulty::Medium).await;
    let v = guess(&mut s, "É");
    assert_eq!(v.word, "_ _ _ _ é _ é");
    assert_eq!(v.alert_type, AlertKind::Success);
  }

  #[tokio::test]
  async fn guessing_every_letter_always_wins() {
    let names = ["Pikachu", "Bulbasaur", "Mr. Mime", "Farfetch'd", "Porygon-Z", "Nidoran"];
    let mut rng = StdRng::seed_from_u64(9);
    for name in names {
      for _ in 0..5 {
        let mut s = session_with(name, Difficulty::Easy).await;
        let mut letters: Vec<char> = name
          .chars()
          .filter(|c| c.is_alphabetic())
          .map(fold_letter)
          .collect::<HashSet<_>>()
          .into_iter()
          .collect();
        letters.sort_unstable();
        letters.shuffle(&mut rng);
        let len = name.chars().count();
        for (i, c) in letters.iter().enumerate() {
          let v = guess(&mut s, &c.to_string());
          let round = s.active_round.as_ref().unwrap();
          assert_eq!(round.reveal_mask.len(), len);
          assert_eq!(v.attempts_left, 10);
          assert_eq!(v.active, i + 1 < letters.len(), "{name}: {letters:?}");
        }
        assert_eq!(s.rounds_won, 1, "{name}");
      }
    }
  }

  #[tokio::test]
  async fn attempts_only_drop_on_new_wrong_letters() {
    let mut s = session_with("Snorlax", Difficulty::Easy).await;
    let mut last = 10;
    for g in ["s", "z", "z", "1", "q", "n", "S", "j", "o"] {
      let was_new_wrong = {
        let r = s.active_round.as_ref().unwrap();
        let c = g.to_lowercase().chars().next().unwrap();
        c.is_alphabetic() && !r.has_guessed(c) && !"snorlax".contains(c)
      };
      let v = guess(&mut s, g);
      if was_new_wrong {
        assert_eq!(v.attempts_left, last - 1, "guess {g}");
      } else {
        assert_eq!(v.attempts_left, last, "guess {g}");
      }
      last = v.attempts_left;
    }
    assert_eq!(last, 7);
  }

  #[tokio::test]
  async fn campaign_never_repeats_then_completes() {
    let bank = FixedBank::new(&["Pikachu", "Eevee", "Mew", "Onix"]);
    let mut s = SessionState::default();
    let mut seen = HashSet::new();
    let mut r = rng();
    for _ in 0..4 {
      let view = start_round(&mut s, Difficulty::Extreme, &bank, &mut r).await;
      round_of(&view);
      let name = s.active_round.as_ref().unwrap().target_name.clone();
      assert!(seen.insert(name), "name repeated");
      // Win the first pick of each pair, lose the other.
      if seen.len() % 2 == 1 {
        for c in s.active_round.as_ref().unwrap().target_name.to_lowercase().chars() {
          let _ = submit_guess(&mut s, &c.to_string());
        }
      } else {
        submit_guess(&mut s, "z").unwrap();
      }
    }
    assert_eq!(s.encountered_names.len(), 4);

    let view = start_round(&mut s, Difficulty::Extreme, &bank, &mut r).await;
    assert_eq!(
      view,
      GameView::CampaignComplete(CompletionView {
        title: COMPLETE_TITLE.into(),
        caught_pokemon: 2,
        total_pokemon: 4,
        rounds_won: 2,
        rounds_lost: 2,
      })
    );
    assert!(s.active_round.is_none());
    assert_eq!(bank.lookups.load(Ordering::SeqCst), 4);
  }

  #[tokio::test]
  async fn same_seed_same_pick() {
    let bank = FixedBank::new(&["Pikachu", "Eevee", "Mew", "Onix", "Ditto", "Abra"]);
    let mut a = SessionState::default();
    let mut b = SessionState::default();
    start_round(&mut a, Difficulty::Medium, &bank, &mut StdRng::seed_from_u64(5)).await;
    start_round(&mut b, Difficulty::Medium, &bank, &mut StdRng::seed_from_u64(5)).await;
    assert_eq!(
      a.active_round.unwrap().target_name,
      b.active_round.unwrap().target_name
    );
  }

  #[tokio::test]
  async fn missing_image_does_not_block_play() {
    let mut bank = FixedBank::new(&["Mew"]);
    bank.image = None;
    let mut s = SessionState::default();
    let view = start_round(&mut s, Difficulty::Medium, &bank, &mut rng()).await;
    let v = round_of(&view);
    assert_eq!(v.image_ref, None);
    assert_eq!(v.image_class, ImageVisibility::Blurred);
    assert!(v.active);
  }

  #[tokio::test]
  async fn change_difficulty_keeps_lifetime_stats() {
    let bank = FixedBank::new(&["Mew", "Eevee"]);
    let mut s = SessionState::default();
    start_round(&mut s, Difficulty::Easy, &bank, &mut rng()).await;
    for c in s.active_round.as_ref().unwrap().target_name.to_lowercase().chars() {
      let _ = submit_guess(&mut s, &c.to_string());
    }
    assert_eq!(s.rounds_won, 1);

    let view = change_difficulty(&mut s, Difficulty::Hard);
    assert!(matches!(view, GameView::Lobby(LobbyView { rounds_won: 1, caught: 1, .. })));
    assert!(s.active_round.is_none());
    assert!(s.encountered_names.is_empty());
    assert_eq!(s.difficulty, Difficulty::Hard);
    assert_eq!(s.rounds_won, 1);
    assert_eq!(s.caught_names.len(), 1);
  }

  #[tokio::test]
  async fn restart_clears_counters_but_not_collection() {
    let mut s = session_with("Mew", Difficulty::Hard).await;
    for g in ["m", "e", "w"] {
      guess(&mut s, g);
    }
    s.rounds_lost = 3;
    restart(&mut s);
    assert_eq!(s.difficulty, Difficulty::Hard);
    assert_eq!((s.rounds_won, s.rounds_lost), (0, 0));
    assert!(s.encountered_names.is_empty());
    assert!(s.active_round.is_none());
    assert!(s.caught_names.contains("Mew"));
  }

  #[tokio::test]
  async fn reset_forgets_everything() {
    let mut s = session_with("Mew", Difficulty::Extreme).await;
    for g in ["m", "e", "w"] {
      guess(&mut s, g);
    }
    let view = reset(&mut s);
    assert!(matches!(view, GameView::Lobby(LobbyView { rounds_won: 0, caught: 0, difficulty: Difficulty::Medium, .. })));
    assert!(s.caught_names.is_empty());
  }

  #[tokio::test]
  async fn resume_keeps_round_of_same_difficulty() {
    let bank = FixedBank::new(&["Pikachu", "Eevee"]);
    let mut s = SessionState::default();
    start_round(&mut s, Difficulty::Medium, &bank, &mut rng()).await;
    let name = s.active_round.as_ref().unwrap().target_name.clone();
    submit_guess(&mut s, "e").unwrap();

    resume_or_start(&mut s, Difficulty::Medium, &bank, &mut rng()).await;
    assert_eq!(s.active_round.as_ref().unwrap().target_name, name);
    assert_eq!(s.encountered_names.len(), 1);

    resume_or_start(&mut s, Difficulty::Easy, &bank, &mut rng()).await;
    assert_ne!(s.active_round.as_ref().unwrap().target_name, name);
    assert_eq!(s.encountered_names.len(), 2);
  }

  #[tokio::test]
  async fn finished_round_view_shows_answer_until_next_round() {
    let mut s = session_with("Eevee", Difficulty::Hard).await;
    for g in ["x", "y", "z"] {
      guess(&mut s, g);
    }
    let v = round_of(&current_view(&s)).clone();
    assert!(v.round_complete);
    assert_eq!(v.word, "Eevee");
    assert_eq!(v.message, "");
  }
}
