//! Terminal presentation: renders game events and parses typed commands.

use std::io::Write;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use geoduel_common::GameMode;
use geoduel_engine::{EventSink, GameEvent};

/// Player input, one per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Guess { higher: bool },
    PlayAgain,
    Mode(GameMode),
    Share,
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_command(line: &str) -> Command {
    let input = line.trim();
    match input {
        "" => Command::PlayAgain,
        "h" | "H" | "up" | "higher" => Command::Guess { higher: true },
        "l" | "L" | "down" | "lower" => Command::Guess { higher: false },
        "p" | "P" => Command::Mode(GameMode::Population),
        "a" | "A" => Command::Mode(GameMode::Area),
        "g" | "G" => Command::Mode(GameMode::Gdp),
        "s" | "share" => Command::Share,
        "?" | "help" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        other => match GameMode::from_str(other) {
            Ok(mode) => Command::Mode(mode),
            Err(_) => Command::Unknown(other.to_string()),
        },
    }
}

pub const HELP: &str = "\
  h / up     the right-hand country is higher
  l / down   the right-hand country is lower
  Enter      play again after game over
  p / a / g  switch to population / area / GDP
  s          print share text
  q          quit";

/// Prints events, either as prose or as one JSON object per line.
pub struct TerminalSink {
    json: bool,
    out: Mutex<Box<dyn Write + Send>>,
}

impl TerminalSink {
    pub fn new(json: bool) -> Self {
        Self::with_writer(json, std::io::stdout())
    }

    pub fn with_writer(json: bool, out: impl Write + Send + 'static) -> Self {
        Self {
            json,
            out: Mutex::new(Box::new(out)),
        }
    }
}

impl EventSink for TerminalSink {
    fn emit(&self, event: GameEvent) {
        let text = if self.json {
            match serde_json::to_string(&event) {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to serialize event");
                    return;
                }
            }
        } else {
            render(&event)
        };

        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = write_line(&mut *out, &text) {
            tracing::debug!(error = %e, event = event.event_type(), "Failed to write event");
        }
    }
}

fn write_line(out: &mut dyn Write, text: &str) -> std::io::Result<()> {
    writeln!(out, "{text}")?;
    out.flush()
}

/// Human-readable rendering of one event.
pub fn render(event: &GameEvent) -> String {
    match event {
        GameEvent::Round { left, right, mode } => format!(
            "\n[{mode}] {} has {} {}.\n  Does {} have a higher or lower {}? (h/l)",
            left.name,
            mode.display_value(left),
            mode.value_text(),
            right.name,
            mode.value_text(),
        ),
        GameEvent::ValueRevealed { name, display, .. } => format!("  {name}: {display}"),
        GameEvent::GuessResult { correct: true } => "  Correct!".to_string(),
        GameEvent::GuessResult { correct: false } => "  Wrong!".to_string(),
        GameEvent::ScoreChanged {
            score,
            high_score,
            is_new_high,
        } => {
            let marker = if *is_new_high { "  New high score!" } else { "" };
            format!("  Score: {score}  High score: {high_score}{marker}")
        }
        GameEvent::GameOver {
            score,
            high_score,
            mode,
            new_high,
        } => {
            let mut text = format!(
                "\nGame over! You scored {score} in {mode} mode (high score {high_score})."
            );
            if *new_high {
                text.push_str("\nCongratulations, that's a new high score!");
            }
            text.push_str("\nPress Enter to play again, s to share, or q to quit.");
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use geoduel_common::Country;

    use super::*;

    #[test]
    fn keys_map_to_commands() {
        assert_eq!(parse_command("h"), Command::Guess { higher: true });
        assert_eq!(parse_command("H"), Command::Guess { higher: true });
        assert_eq!(parse_command(" up "), Command::Guess { higher: true });
        assert_eq!(parse_command("L"), Command::Guess { higher: false });
        assert_eq!(parse_command("down"), Command::Guess { higher: false });
        assert_eq!(parse_command(""), Command::PlayAgain);
        assert_eq!(parse_command("g"), Command::Mode(GameMode::Gdp));
        assert_eq!(parse_command("Area"), Command::Mode(GameMode::Area));
        assert_eq!(parse_command("s"), Command::Share);
        assert_eq!(parse_command("q"), Command::Quit);
        assert_eq!(parse_command("xyz"), Command::Unknown("xyz".into()));
    }

    #[test]
    fn round_hides_right_hand_value() {
        let left = Country {
            name: "Peru".into(),
            population: 34_000_000,
            area: 1_285_216.0,
            gdp: 2.4e11,
            flag: "https://flagcdn.com/w320/pe.png".into(),
            code: "PER".into(),
        };
        let right = Country {
            name: "Chile".into(),
            population: 19_116_209,
            area: 756_102.0,
            gdp: 3.0e11,
            flag: "https://flagcdn.com/w320/cl.png".into(),
            code: "CHL".into(),
        };
        let text = render(&GameEvent::Round {
            left,
            right,
            mode: GameMode::Gdp,
        });
        assert!(text.contains("Peru has $240.00 billion USD GDP"));
        assert!(!text.contains("$300.00 billion"));
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
        }
    }

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn json_mode_writes_one_event_per_line() {
        let buf = SharedBuf::default();
        let sink = TerminalSink::with_writer(true, buf.clone());
        sink.emit(GameEvent::GuessResult { correct: true });
        sink.emit(GameEvent::GuessResult { correct: false });

        let written = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"type":"guess_result","correct":true}"#);
    }

    #[test]
    fn closed_output_is_reported_not_fatal() {
        assert!(write_line(&mut ClosedPipe, "lost").is_err());

        let sink = TerminalSink::with_writer(true, ClosedPipe);
        sink.emit(GameEvent::GuessResult { correct: true });
        sink.emit(GameEvent::GuessResult { correct: false });
    }

    #[test]
    fn game_over_mentions_new_high_only_when_set() {
        let over = |new_high| {
            render(&GameEvent::GameOver {
                score: 4,
                high_score: 4,
                mode: GameMode::Area,
                new_high,
            })
        };
        assert!(over(true).contains("new high score"));
        assert!(!over(false).contains("new high score"));
    }
}
