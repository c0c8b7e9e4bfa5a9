use aurora::client::ChatClient;
use aurora::config::ConfigManager;
use aurora::models::{ChatRequest, Conversation, Message};

use color_eyre::Result;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing to stderr so stdout stays clean for the transcript.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

/// Stream one assistant reply to stdout, printing fragments as they
/// arrive, and return the final transcript.
async fn stream_reply(client: &ChatClient, request: &ChatRequest) -> Result<String> {
    let (tx, mut rx) = mpsc::unbounded_channel();

    let client = client.clone();
    let request = request.clone();
    let stream_task = tokio::spawn(async move { client.stream_chat(&request, tx).await });

    // The transcript is append-only, so printing the suffix past the last
    // printed length renders exactly the newest fragment.
    let mut printed = 0;
    while let Some(update) = rx.recv().await {
        print!("{}", &update.transcript[printed..]);
        std::io::stdout().flush()?;
        printed = update.transcript.len();
    }
    println!();

    let transcript = stream_task.await??;
    Ok(transcript)
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let config = ConfigManager::new()
        .map(|manager| manager.load())
        .unwrap_or_default()
        .with_env_overrides();

    let client = ChatClient::new(&config);
    let mut conversation = Conversation::new();

    println!("aurora v{VERSION} - {} ({})", config.model, config.base_url);
    println!("type a message, or /quit to exit\n");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "/quit" || input == "/exit" {
            break;
        }

        conversation.push(Message::user(input));
        let request = ChatRequest::from_history(&config.model, conversation.messages());

        match stream_reply(&client, &request).await {
            Ok(reply) => conversation.push(Message::assistant(reply)),
            Err(err) => eprintln!("error: {err}"),
        }
    }

    Ok(())
}
