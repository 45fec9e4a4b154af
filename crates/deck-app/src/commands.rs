//! Line commands read from stdin

use anyhow::{bail, Context, Result};
use deck_core::{InputEvent, Key, TouchTracker};

/// A parsed command line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Input(InputEvent),
    Help,
    Quit,
}

pub const HELP: &str = "commands: next | back | goto N | key NAME | swipe DX DY | touch X1 Y1 X2 Y2 | help | quit";

/// Parse one line of input
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = parts.collect();

    let command = match word.to_ascii_lowercase().as_str() {
        "next" | "n" => Command::Input(InputEvent::Next),
        "back" | "b" => Command::Input(InputEvent::Back),
        "goto" | "g" => {
            let [page] = expect_args::<1>(word, &args)?;
            let page = page.parse::<i64>().with_context(|| format!("invalid page '{}'", page))?;
            Command::Input(InputEvent::GoTo(page))
        }
        "key" | "k" => {
            // A bare `key` is a space bar press
            let name = args.first().copied().unwrap_or(" ");
            Command::Input(InputEvent::Key(Key::from(name)))
        }
        "swipe" => {
            let [dx, dy] = parse_floats::<2>(word, &args)?;
            Command::Input(InputEvent::Swipe { dx, dy })
        }
        "touch" => {
            let [x1, y1, x2, y2] = parse_floats::<4>(word, &args)?;
            let mut tracker = TouchTracker::new();
            tracker.touch_start(x1, y1);
            let (dx, dy) = tracker.touch_end(x2, y2).unwrap_or_default();
            Command::Input(InputEvent::Swipe { dx, dy })
        }
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => bail!("unknown command '{}'", other),
    };

    Ok(Some(command))
}

fn expect_args<'a, const N: usize>(word: &str, args: &[&'a str]) -> Result<[&'a str; N]> {
    match <[&str; N]>::try_from(args) {
        Ok(args) => Ok(args),
        Err(_) => bail!("'{}' takes {} argument(s), got {}", word, N, args.len()),
    }
}

fn parse_floats<const N: usize>(word: &str, args: &[&str]) -> Result<[f32; N]> {
    let raw = expect_args::<N>(word, args)?;
    let mut values = [0.0; N];
    for (value, text) in values.iter_mut().zip(raw) {
        let parsed = text.parse::<f32>().with_context(|| format!("invalid number '{}'", text))?;
        if !parsed.is_finite() {
            bail!("invalid number '{}'", text);
        }
        *value = parsed;
    }
    Ok(values)
}
