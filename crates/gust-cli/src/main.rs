//! gust - terminal chat client for a streaming weather agent

mod commands;
mod config;
mod utils;

use clap::Parser;
use gust_chat::{Chat, ChatEvent};
use gust_stream::{Role, TurnOutcome};
use std::io::{self, Write};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing_subscriber::EnvFilter;

/// gust - chat with a weather agent
#[derive(Parser, Debug)]
#[command(name = "gust")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Agent stream endpoint (overrides config)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Continue an existing thread instead of starting a new one
    #[arg(long)]
    thread_id: Option<String>,

    /// Sampling temperature (overrides config)
    #[arg(long)]
    temperature: Option<f32>,

    /// Run in non-interactive mode with a single prompt
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup tracing; logs go to stderr so streamed replies stay clean
    let filter = if args.verbose {
        EnvFilter::new("gust=debug,gust_chat=debug,gust_stream=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let cfg = config::Config::load();

    // Merge config with CLI args (CLI takes precedence)
    let endpoint = args
        .endpoint
        .clone()
        .unwrap_or_else(|| cfg.endpoint().to_string());

    let mut options = cfg.run_options();
    if let Some(temperature) = args.temperature {
        options.temperature = temperature;
    }

    let mut chat = Chat::from_endpoint(&endpoint, options)?;
    if let Some(thread_id) = args.thread_id.or(cfg.thread_id) {
        chat = chat.with_thread_id(thread_id);
    }
    tracing::debug!("Using endpoint {} on {}", endpoint, chat.thread_id());

    // Non-interactive mode
    if let Some(command) = args.command {
        return run_command(&mut chat, &command).await;
    }

    run_interactive(&mut chat).await
}

async fn run_command(chat: &mut Chat, command: &str) -> anyhow::Result<()> {
    match run_turn(chat, command).await {
        Some(TurnOutcome::Failed(_)) => std::process::exit(1),
        Some(TurnOutcome::Finished) => Ok(()),
        None => {
            eprintln!("Nothing to send.");
            std::process::exit(2);
        }
    }
}

/// Submit one message, printing reply text as it streams in
async fn run_turn(chat: &mut Chat, input: &str) -> Option<TurnOutcome> {
    let mut events = chat.subscribe();
    let mut printer = ReplyPrinter::default();

    let outcome = {
        let submit = chat.submit(input);
        tokio::pin!(submit);

        loop {
            tokio::select! {
                outcome = &mut submit => break outcome,
                event = events.recv() => match event {
                    Ok(event) => printer.print(&event),
                    Err(RecvError::Lagged(n)) => tracing::debug!("Skipped {} chat events", n),
                    Err(RecvError::Closed) => {}
                },
            }
        }
    };

    // Events sent after the last poll are still queued
    loop {
        match events.try_recv() {
            Ok(event) => printer.print(&event),
            Err(TryRecvError::Lagged(n)) => tracing::debug!("Skipped {} chat events", n),
            Err(_) => break,
        }
    }

    outcome
}

/// Tracks how much of the streaming reply is already on screen.
///
/// Deltas and the final message carry the whole reply so far, so skipped
/// events only delay output and never lose text.
#[derive(Debug, Default)]
struct ReplyPrinter {
    started: bool,
    printed: usize,
}

impl ReplyPrinter {
    /// Speaker label, returned once per reply
    fn header(&mut self) -> String {
        if self.started {
            String::new()
        } else {
            self.started = true;
            format!("{}: ", Role::Assistant.label())
        }
    }

    /// Part of `content` not yet printed
    fn tail<'a>(&mut self, content: &'a str) -> &'a str {
        let tail = content.get(self.printed..).unwrap_or("");
        self.printed = self.printed.max(content.len());
        tail
    }

    fn print(&mut self, event: &ChatEvent) {
        match event {
            ChatEvent::TurnStart { .. } => {
                print!("{}", self.header());
            }
            ChatEvent::Delta { content, .. } => {
                print!("{}{}", self.header(), self.tail(content));
            }
            ChatEvent::TurnEnd { message } => {
                println!("{}{}", self.header(), self.tail(message.content()));
            }
            ChatEvent::TurnError { message, .. } => {
                println!("{}", self.header());
                eprintln!("{}", message.content());
            }
            ChatEvent::Cleared => {
                println!("Cleared conversation.");
            }
        }
        let _ = io::stdout().flush();
    }
}

async fn run_interactive(chat: &mut Chat) -> anyhow::Result<()> {
    // Show minimal startup info (only if TTY)
    if io::IsTerminal::is_terminal(&io::stderr()) {
        eprintln!("gust thread: {}", chat.thread_id());
        eprintln!("Ask about the weather anywhere. Type /help for commands.");
        eprintln!();
    }

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        // Handle slash commands
        if let Some(result) = commands::execute_command(input, chat.conversation(), chat.thread_id())
        {
            match result {
                commands::CommandResult::Clear => {
                    chat.reset();
                    println!("Cleared conversation.");
                }
                commands::CommandResult::Exit => {
                    break;
                }
                commands::CommandResult::Message(msg) => {
                    println!("{}", msg);
                }
                commands::CommandResult::Unknown(cmd) => {
                    println!("Unknown command: /{}", cmd);
                    println!("Type /help for available commands.");
                }
            }
            continue;
        }

        run_turn(chat, input).await;
        println!();
    }

    Ok(())
}
