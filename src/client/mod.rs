//! The consuming side of the relay: decodes the relayed stream and grows
//! the assistant's message one delta at a time.

mod assembler;
mod conversation;
mod transport;

use futures_util::StreamExt;

pub use assembler::{AssemblerError, MessageAssembler, Phase};
pub use conversation::{Conversation, ConversationError, FAILURE_NOTICE};
pub use transport::{ClientError, ClientEventStream, RelayClient};

/// Presents the conversation. Called after every change.
pub trait Renderer {
    fn render(&mut self, conversation: &Conversation);
}

/// Run one exchange for `text` from submission to the final event.
///
/// Only a rejected submission is an error. Transport failures end up in
/// the conversation as the failure notice.
pub async fn run_exchange<R: Renderer>(
    client: &RelayClient,
    assembler: &mut MessageAssembler,
    text: &str,
    renderer: &mut R,
) -> Result<(), AssemblerError> {
    let history = assembler.submit(text)?;
    renderer.render(assembler.conversation());

    let mut events = match client.send(&history).await {
        Ok(events) => events,
        Err(e) => {
            tracing::error!("Failed to get a response from the relay: {}", e);
            if assembler.fail() {
                renderer.render(assembler.conversation());
            }
            return Ok(());
        }
    };
    assembler.response_started();

    while let Some(item) = events.next().await {
        let changed = match item {
            Ok(event) => assembler.apply(&event),
            Err(e) => {
                tracing::error!("Relay stream failed: {}", e);
                assembler.fail()
            }
        };
        if changed {
            renderer.render(assembler.conversation());
        }
        if assembler.phase() == Phase::Idle {
            return Ok(());
        }
    }

    if assembler.stream_ended() {
        renderer.render(assembler.conversation());
    }
    Ok(())
}
