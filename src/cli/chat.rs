use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::client::{Conversation, MessageAssembler, RelayClient, Renderer, run_exchange};
use crate::openai::Role;

/// Prints the open reply as it grows, writing only the text that is new
/// since the last render.
#[derive(Default)]
struct TerminalRenderer {
    message_index: usize,
    printed: usize,
}

impl Renderer for TerminalRenderer {
    fn render(&mut self, conversation: &Conversation) {
        let Some(last) = conversation.last() else {
            return;
        };
        if last.role != Role::Assistant {
            return;
        }

        let index = conversation.len() - 1;
        if index != self.message_index {
            self.message_index = index;
            self.printed = 0;
        }

        if let Some(new_text) = last.content.get(self.printed..) {
            print!("{}", new_text);
            let _ = std::io::stdout().flush();
        }
        self.printed = last.content.len();
    }
}

pub async fn run(url: &str, idle_timeout: u64) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let client = RelayClient::new(url).with_idle_timeout(Duration::from_secs(idle_timeout));
    let mut assembler = MessageAssembler::new();
    let mut renderer = TerminalRenderer::default();

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());
                if let Err(e) = run_exchange(&client, &mut assembler, &line, &mut renderer).await {
                    println!("{}", e);
                    continue;
                }
                println!();
            }
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
