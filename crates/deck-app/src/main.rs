//! Main application entry point
//!
//! Loads a deck configuration (first argument, or the built-in demo deck),
//! reads navigation commands from stdin and logs what a renderer would draw.

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use deck_core::{effects::FRAME_MS, Arrival, DeckConfig, InputEvent, NavigatorDriver, Presentation};

mod commands;

use commands::{parse_command, Command, HELP};

/// Read commands from stdin until EOF or `quit`
async fn read_commands(inputs: mpsc::Sender<InputEvent>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Ok(Some(Command::Input(event))) => {
                if inputs.send(event).await.is_err() {
                    break;
                }
            }
            Ok(Some(Command::Help)) => println!("{}", HELP),
            Ok(Some(Command::Quit)) => break,
            Ok(None) => {}
            Err(err) => warn!("{:#}", err),
        }
    }

    Ok(())
}

/// Status line for `page`, e.g. `[2/4] stats  < ○ ● ○ ○`
fn status_line(presentation: &Presentation, page: usize) -> String {
    let total = presentation.pages.len();
    format!(
        "[{}/{}] {}  {}",
        page + 1,
        total,
        presentation.pages[page],
        presentation.indicators.render_line_for(page, total)
    )
}

/// Report arrivals and play the effect models a renderer would consume
///
/// Arrivals can queue up behind a running counter animation, so each line
/// describes the arrival itself rather than the navigator's live state.
async fn report_arrivals(
    presentation: &Presentation,
    mut arrivals: mpsc::UnboundedReceiver<Arrival>,
    mut emit: impl FnMut(String),
) {
    while let Some(arrival) = arrivals.recv().await {
        emit(status_line(presentation, arrival.page));

        for burst in presentation.resources.bursts.drain_page(arrival.page) {
            info!(
                page = burst.page,
                kind = ?burst.kind,
                particles = burst.particle_count,
                "Burst"
            );
        }

        let counters = &presentation.resources.counters;
        if counters.is_running() {
            let mut frames = tokio::time::interval(Duration::from_millis(FRAME_MS));
            while counters.tick_frame() {
                frames.tick().await;
            }
            info!(values = ?counters.displays(), "Counters settled");
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading deck configuration: {}", path);
            DeckConfig::from_path(&path).with_context(|| format!("failed to load {}", path))?
        }
        None => {
            info!("No configuration given, using the demo deck");
            DeckConfig::default()
        }
    };

    let presentation = Presentation::from_config(&config).context("invalid deck configuration")?;

    info!("Starting storydeck with {} pages", presentation.pages.len());
    println!("{}", HELP);
    println!("{}", status_line(&presentation, presentation.navigator.current_page()));

    let (input_tx, input_rx) = mpsc::channel(32);
    let (arrival_tx, arrival_rx) = mpsc::unbounded_channel();

    let reader = tokio::spawn(read_commands(input_tx));
    let driver = NavigatorDriver::new(&presentation).with_arrivals(arrival_tx);

    tokio::join!(
        driver.run(input_rx),
        report_arrivals(&presentation, arrival_rx, |line| println!("{}", line))
    );

    reader.await.context("command reader panicked")??;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_queued_arrivals_are_reported_as_they_happened() {
        let presentation = Presentation::from_config(&DeckConfig::default()).unwrap();
        let navigator = &presentation.navigator;
        let delay = navigator.settle_delay();
        let (arrival_tx, arrival_rx) = mpsc::unbounded_channel();

        // Both arrivals commit before the reporter sees the first one
        let mut now = Instant::now();
        for target in [1, 2] {
            navigator.go_to_page(target, now);
            now += delay;
            arrival_tx.send(navigator.tick(now).unwrap()).unwrap();
        }
        drop(arrival_tx);
        assert_eq!(presentation.resources.bursts.len(), 1);

        let mut lines = Vec::new();
        report_arrivals(&presentation, arrival_rx, |line| lines.push(line)).await;

        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("stats"), "{}", lines[0]);
        assert!(lines[0].contains("< ○ ● ○ ○"), "{}", lines[0]);
        assert!(lines[1].contains("celebration"), "{}", lines[1]);
        assert!(lines[1].contains("< ○ ○ ● ○"), "{}", lines[1]);
        assert!(presentation.resources.bursts.is_empty());
        assert!(!presentation.resources.counters.is_running());
    }

    #[test]
    fn test_status_line_on_first_page() {
        let presentation = Presentation::from_config(&DeckConfig::default()).unwrap();
        assert_eq!(status_line(&presentation, 0), "[1/4] intro    ● ○ ○ ○");
    }
}
