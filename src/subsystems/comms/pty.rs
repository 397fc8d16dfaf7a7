//! Console channel. Reads one query per line, prints the reply.
//!
//! Generic over the reader and writer so tests can feed scripted input.
//! Runs until end-of-input or until `shutdown` is cancelled (Ctrl-C), which
//! also interrupts a turn waiting on a model or the memory store. Any error
//! from the chat turn ends the loop and is returned to the caller.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::AppError;
use crate::subsystems::agents::memory_chat::MemoryChat;

const PROMPT: &str = "> ";

/// Why the console stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleExit {
    EndOfInput,
    Shutdown,
}

pub async fn run_console<R, W>(
    chat: &MemoryChat,
    reader: R,
    mut writer: W,
    shutdown: CancellationToken,
) -> Result<ConsoleExit, AppError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!(user_id = %chat.user_id(), "console started");
    let mut lines = reader.lines();

    let exit = loop {
        writer.write_all(PROMPT.as_bytes()).await?;
        writer.flush().await?;

        let line = tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                info!("console shutting down");
                break ConsoleExit::Shutdown;
            }

            line = lines.next_line() => line?,
        };

        let Some(input) = line else {
            info!("console input closed");
            break ConsoleExit::EndOfInput;
        };

        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        debug!(input, "console received line");

        // A turn in flight is abandoned on shutdown; its memory write may not happen.
        let reply = tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                info!("console shutting down mid-turn");
                break ConsoleExit::Shutdown;
            }

            reply = chat.respond(input) => reply?,
        };
        writer.write_all(reply.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    };

    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(exit)
}
