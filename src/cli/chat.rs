use std::sync::Arc;

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::api::HttpBackend;
use crate::chat::{ConversationSession, SessionBuilder};
use crate::core::AppConfig;

/// What to do with one line of REPL input.
#[derive(Debug, PartialEq)]
enum Input<'a> {
    Quit,
    Clear,
    Skip,
    Submit(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let text = line.trim();
    match text.to_lowercase().as_str() {
        "quit" | "exit" | "q" => Input::Quit,
        "/clear" => Input::Clear,
        "" => Input::Skip,
        _ => Input::Submit(text),
    }
}

pub fn session(config: &AppConfig) -> ConversationSession {
    let backend =
        HttpBackend::new(&config.api_base_url).with_timeout(config.request_timeout);
    SessionBuilder::new(Arc::new(backend)).build()
}

pub async fn run(config: &AppConfig) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let session = session(config);

    tracing::info!(
        "Started session {} against {}",
        session.id(),
        config.api_base_url
    );
    if !session.check_liveness().await {
        println!(
            "Warning: the booking service at {} is not responding.",
            config.api_base_url
        );
    }

    loop {
        let readline = rl.readline("User: ");
        match readline {
            Ok(line) => match parse_input(&line) {
                Input::Quit => {
                    println!("Goodbye!");
                    break;
                }
                Input::Clear => {
                    session.clear();
                    println!("Conversation cleared.");
                }
                Input::Skip => {}
                Input::Submit(text) => {
                    rl.add_history_entry(text)?;
                    // Empty text is filtered above and the REPL never
                    // overlaps submissions
                    let reply = session.submit(text).await?;
                    println!("Assistant: {}", reply.content);
                }
            },
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
