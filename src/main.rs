//! Application entry point — console front end for Morse Messenger.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create the [`tokio`] runtime.
//! 4. Build the audio output and [`Transmitter`].
//! 5. Spawn the chat orchestrator.
//! 6. Read commands from stdin until `/quit` or EOF.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use morse_messenger::{
    audio::create_output,
    callsign::lookup_url,
    chat::{new_shared_chat, ChatCommand, ChatOrchestrator, Direction, SharedChat},
    config::{AppConfig, AppPaths},
    morse::{decode, encode},
    transmit::Transmitter,
};

const HELP: &str = "\
commands:
  <text>          key a message
  /stop           stop the transmission on air
  /rx <text>      simulate a received message
  /decode <morse> decode dots and dashes (letters: 1 space, words: 3 spaces)
  /wpm <n>        set speed (4-60)
  /tone <hz>      set pitch (300-1000)
  /call <sign>    set this station's callsign
  /log            show the chat log
  /quit           exit";

// ---------------------------------------------------------------------------
// Console
// ---------------------------------------------------------------------------

/// What a console line asks for.
enum Line {
    Command(ChatCommand),
    Decode(String),
    Log,
    Help,
    Quit,
    Invalid(String),
}

fn parse_line(line: &str, chat: &SharedChat) -> Line {
    let line = line.trim();
    let (head, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match head {
        "/quit" | "/q" => Line::Quit,
        "/help" | "/?" => Line::Help,
        "/log" => Line::Log,
        "/stop" => Line::Command(ChatCommand::Stop),
        "/rx" => Line::Command(ChatCommand::Receive(rest.to_string())),
        "/decode" => Line::Decode(rest.to_string()),
        "/call" => Line::Command(ChatCommand::UpdateStation {
            callsign: rest.to_string(),
        }),
        "/wpm" | "/tone" => {
            let Ok(value) = rest.parse::<f64>() else {
                return Line::Invalid(format!("{head} needs a number"));
            };
            let keying = chat
                .lock()
                .map(|st| st.config.keying.clone())
                .unwrap_or_default();
            let (wpm, tone_hz) = if head == "/wpm" {
                (value, keying.tone_hz)
            } else {
                (keying.wpm, value)
            };
            Line::Command(ChatCommand::UpdateKeying { wpm, tone_hz })
        }
        _ if head.starts_with('/') => Line::Invalid(format!("unknown command {head}")),
        _ => Line::Command(ChatCommand::Send(line.to_string())),
    }
}

fn print_log(chat: &SharedChat) {
    let Ok(st) = chat.lock() else {
        return;
    };
    for msg in &st.messages {
        let who = match msg.direction {
            Direction::Sent => "TX",
            Direction::Received => "RX",
        };
        let status = if msg.transmitting { " (on air)" } else { "" };
        println!("[{who}] {}  SNR {} dB{status}", msg.text, msg.snr_db);
        println!("       {}", encode(&msg.text));
        for call in msg.callsigns() {
            println!("       {call}: {}", lookup_url(call));
        }
    }
    if let Some(err) = &st.last_error {
        println!("last error: {err}");
    }
}

async fn console(chat: SharedChat, command_tx: mpsc::Sender<ChatCommand>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{HELP}");

    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(&line, &chat) {
            Line::Command(command) => {
                if command_tx.send(command).await.is_err() {
                    log::error!("chat orchestrator stopped");
                    break;
                }
            }
            Line::Decode(morse) => match decode(&morse) {
                Ok(text) => println!("{text}"),
                Err(e) => println!("{e}"),
            },
            Line::Log => print_log(&chat),
            Line::Help => println!("{HELP}"),
            Line::Quit => break,
            Line::Invalid(reason) => println!("{reason}"),
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Morse Messenger starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    if !config.station.has_valid_callsign() {
        log::warn!("no valid callsign configured; set one with /call before sending");
    }

    // 3. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    rt.block_on(async move {
        // 4. Output + transmitter
        let output = create_output(&config.audio);
        log::info!("audio output: {}", output.name());
        let transmitter = Arc::new(Transmitter::new(output));

        // 5. Chat orchestrator
        let chat = new_shared_chat(config);
        let (command_tx, command_rx) = mpsc::channel::<ChatCommand>(16);
        let orchestrator = ChatOrchestrator::new(Arc::clone(&chat), Arc::clone(&transmitter))
            .with_settings_path(AppPaths::new().settings_file);
        let orchestrator = tokio::spawn(orchestrator.run(command_rx));

        // 6. Console loop
        let result = console(Arc::clone(&chat), command_tx).await;

        // Closing the channel lets the orchestrator drain; cut the message
        // on air short instead of waiting it out.
        transmitter.stop_current();
        if tokio::time::timeout(Duration::from_secs(5), orchestrator)
            .await
            .is_err()
        {
            log::warn!("chat orchestrator did not shut down in time");
        }

        print_log(&chat);
        result
    })
}
