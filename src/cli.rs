//! Command line interface: mode selection and the interactive chat loop

use crate::runtime::{ConversationEngine, ResponderModel, ToolInvoker};
use crate::session::SessionManager;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Session used by the interactive loop
pub const CLI_SESSION_ID: &str = "cli";

#[derive(Parser, Debug)]
#[command(name = "web-search-agent", author, version, about = "Conversational web search assistant", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve {
        /// Listen port, overrides WEB_SEARCH_AGENT_PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Chat interactively on stdin/stdout
    Chat,
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve { port: None })
    }
}

/// What a single input line asks for
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Skip,
    Quit,
    Reset,
    Query(&'a str),
}

fn classify(line: &str) -> Input<'_> {
    match line.trim() {
        "" => Input::Skip,
        "quit" | "exit" | "q" => Input::Quit,
        "/reset" => Input::Reset,
        text => Input::Query(text),
    }
}

/// Read lines until EOF or a quit command, running one turn per line
pub async fn run_chat<R, T, I, O>(
    engine: &ConversationEngine<R, T>,
    sessions: &SessionManager,
    input: I,
    mut output: O,
) -> std::io::Result<()>
where
    R: ResponderModel,
    T: ToolInvoker,
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    loop {
        output.write_all(b"User: ").await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            output.write_all(b"\n").await?;
            break;
        };

        let text = match classify(&line) {
            Input::Skip => continue,
            Input::Quit => break,
            Input::Reset => {
                match sessions.reset(CLI_SESSION_ID).await {
                    Ok(_) => output.write_all(b"History cleared.\n").await?,
                    Err(failure) => {
                        let line = format!("error [{}]: {failure}\n", failure.reason());
                        output.write_all(line.as_bytes()).await?;
                    }
                }
                continue;
            }
            Input::Query(text) => text,
        };

        let line = match sessions.run_turn(engine, CLI_SESSION_ID, text).await {
            Ok(reply) => format!("Assistant: {}\n", reply.message.text().unwrap_or_default()),
            Err(failure) => format!("error [{}]: {failure}\n", failure.reason()),
        };
        output.write_all(line.as_bytes()).await?;
    }
    output.flush().await
}
