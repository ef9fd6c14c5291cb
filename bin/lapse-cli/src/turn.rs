//! One round of the conversation as the terminal sees it.

use lapse_core::script::FALLBACK_REPLY;
use lapse_core::{GlitchConfig, Message, Stage};
use tracing::{error, warn};

use crate::client::ChatClient;

/// Pick the stage for `elapsed` and, unless `raw`, glitch the typed text.
///
/// The server owns the stage thresholds and glitch probabilities, so it is
/// asked first. If it cannot be reached the built-in defaults are used.
pub async fn prepare(client: &ChatClient, text: &str, elapsed: u64, raw: bool) -> (Stage, String) {
    let remote = if raw {
        client
            .stage(elapsed)
            .await
            .map(|r| (r.stage, text.to_owned()))
    } else {
        client.glitch(text, elapsed).await.map(|r| (r.stage, r.text))
    };

    match remote {
        Ok((n, message)) => match Stage::try_from(n) {
            Ok(stage) => return (stage, message),
            Err(n) => warn!(stage = n, "server reported an unknown stage"),
        },
        Err(e) => warn!(error = %e, "stage lookup failed; using built-in thresholds"),
    }

    let stage = Stage::from_elapsed(elapsed);
    let message = if raw {
        text.to_owned()
    } else {
        GlitchConfig::default().apply(text, stage, &mut rand::thread_rng())
    };
    (stage, message)
}

/// Send `message` and return the partner's reply. A failed send yields
/// [`FALLBACK_REPLY`]; the error itself is only logged.
pub async fn exchange(client: &ChatClient, session_id: &str, message: &str, elapsed: u64) -> Message {
    match client.send(session_id, message, elapsed).await {
        Ok(reply) => Message::partner(reply.response, elapsed),
        Err(e) => {
            error!(error = %e, "failed to send message");
            Message::partner(FALLBACK_REPLY, elapsed)
        }
    }
}
