//! Read-eval-print loop
//!
//! Reads commands line by line, normalizes them into tokens, and dispatches
//! them through the `CommandRegistry`. Input and output are generic so the loop
//! can be driven from tests.

use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::commands::CommandRegistry;
use crate::session::Session;

/// Prompt shown before every command
pub const PROMPT: &str = "Pokedex > ";

/// Lower-cases `text` and splits it on whitespace
pub fn clean_input(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Runs the loop until `exit` or end of input
///
/// Handler errors are printed and the loop carries on; only I/O errors on the
/// input or output end the loop early.
pub async fn run<R, W>(
    registry: &CommandRegistry,
    session: &mut Session,
    input: R,
    output: &mut W,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    while !session.should_quit {
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        let Some(line) = lines.next_line().await? else {
            // End of input: finish the prompt line
            writeln!(output)?;
            break;
        };

        let tokens = clean_input(&line);
        let Some((verb, args)) = tokens.split_first() else {
            continue;
        };

        let Some(command) = registry.get(verb) else {
            writeln!(output, "Unknown command")?;
            continue;
        };

        debug!(command = command.name, ?args, "dispatching");
        match command.run(session, registry, args).await {
            Ok(lines) => {
                for line in lines {
                    writeln!(output, "{}", line)?;
                }
            }
            Err(err) => writeln!(output, "{}", err)?,
        }
    }

    Ok(())
}
