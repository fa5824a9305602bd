//! A terminal front end showing how to use `chat-widget` as a library.

#[macro_use]
extern crate tracing;

use std::env;
use std::io::Write as _;
use std::time::Duration;

use chat_widget::model::{MessageKind, Rating};
use chat_widget::{HttpConfigBuilder, Widget, WidgetBuilder};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::select;
use tokio::time::sleep;

const BAR_CHAR: &str = "▎";
const BASE_URL_VAR: &str = "CHAT_WIDGET_BASE_URL";
const SAMPLE_QUESTIONS: [&str; 3] = [
    "How do I submit RS7 Return?",
    "Fresh Booking Rule ECE",
    "How to process refund payments?",
];

enum Command<'a> {
    Say(&'a str),
    Rate(Rating),
    Relevant(usize, bool),
    Quit,
}

/// Parses one input line. Messages keep the line exactly as typed.
fn parse_command(line: &str) -> Result<Command<'_>, &'static str> {
    let Some(cmd) = line.trim_start().strip_prefix('/') else {
        return Ok(Command::Say(line));
    };
    let mut args = cmd.split_whitespace();
    match args.next() {
        Some("quit") => Ok(Command::Quit),
        Some("rate") => args
            .next()
            .and_then(Rating::from_name)
            .map(Command::Rate)
            .ok_or("usage: /rate <satisfied|neutral|unsatisfied>"),
        Some("relevant") => {
            const USAGE: &str = "usage: /relevant <index> <yes|no>";
            let index = args
                .next()
                .and_then(|arg| arg.parse().ok())
                .ok_or(USAGE)?;
            let is_relevant = match args.next() {
                Some("yes") => true,
                Some("no") => false,
                _ => return Err(USAGE),
            };
            Ok(Command::Relevant(index, is_relevant))
        }
        _ => Err("commands: /rate, /relevant, /quit"),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut config_builder = HttpConfigBuilder::new();
    if let Ok(base_url) = env::var(BASE_URL_VAR) {
        config_builder = config_builder.with_base_url(base_url);
    }
    let config = config_builder.build();
    info!("talking to {}", config.base_url());

    let widget = WidgetBuilder::with_config(config).build();
    let mut lines = BufReader::new(io::stdin()).lines();

    println!("{}", "Try asking:".dimmed());
    for question in SAMPLE_QUESTIONS {
        println!("  {}", question.bright_white());
    }

    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = read_line(&mut lines).await else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match parse_command(&line) {
            Ok(Command::Say(text)) => {
                if !stream_response(&widget, text).await {
                    break;
                }
            }
            Ok(Command::Rate(rating)) => {
                widget.rate(rating);
                println!("Rated this chat as {}.", rating.name());
            }
            Ok(Command::Relevant(index, is_relevant)) => {
                if !widget.mark_relevance(index, is_relevant) {
                    println!("Message {index} is not an assistant response.");
                }
            }
            Ok(Command::Quit) => break,
            Err(usage) => println!("{}", usage.dimmed()),
        }
    }

    widget.close();
}

/// Sends `text` and prints the response as it streams in. Returns `false`
/// if the widget went away.
async fn stream_response(widget: &Widget, text: &str) -> bool {
    let mut state_rx = widget.subscribe();
    // The user message and its placeholder are appended at the end.
    let index = widget.state().conversation.len() + 1;
    widget.send_message(text);

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    let mut progress_bar = None;
    let mut shown = String::new();

    loop {
        if shown.is_empty() {
            progress_bar
                .get_or_insert_with(|| {
                    let progress_bar = ProgressBar::new_spinner();
                    progress_bar.set_style(progress_style.clone());
                    progress_bar.set_message("🤔 Thinking...");
                    progress_bar
                })
                .inc(1);
        }

        let sleep = sleep(Duration::from_millis(100));
        select! {
            changed = state_rx.changed() => {
                if changed.is_err() {
                    return false;
                }
            },
            _ = sleep => {
                continue;
            }
        }

        let state = state_rx.borrow_and_update().clone();
        let Some(msg) = state.conversation.get(index) else {
            continue;
        };
        if msg.content.len() == shown.len() && !msg.complete {
            continue;
        }

        // Finish the progress bar before printing anything else.
        if let Some(progress_bar) = progress_bar.take() {
            progress_bar.finish_and_clear();
            print!("{}🤖 ", BAR_CHAR.bright_cyan());
        }

        if let Some(delta) = msg.content.strip_prefix(shown.as_str()) {
            print!("{}", delta.bright_white());
        } else {
            // Errors replace whatever was streamed so far.
            print!("\n{}{}", BAR_CHAR.bright_red(), msg.content.bright_red());
        }
        std::io::stdout().flush().ok();
        shown.clone_from(&msg.content);

        if msg.complete {
            if msg.kind == MessageKind::ToolCalls {
                print!(" {}", "(tool calls)".dimmed());
            }
            println!("  {}", format!("#{index}").dimmed());
            return true;
        }
    }
}

async fn read_line(lines: &mut Lines<BufReader<Stdin>>) -> Option<String> {
    match lines.next_line().await {
        Ok(line) => line,
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
