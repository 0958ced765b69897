// Response generation: prompt fill and streamed chat completion
use futures_util::stream;
use tracing::{debug, warn};

use crate::rag::prompt::render_prompt;
use crate::streaming::{ChatModel, FragmentStream};

/// Lazily produced answer fragments for one classification turn
pub type ResponseStream = FragmentStream;

/// Prefix of the single fragment emitted when generation could not start
pub const ERROR_SENTINEL_PREFIX: &str = "Error: ";

/// Fill the prompt and start streaming the model's answer.
///
/// Never fails: when the request cannot be started (model missing, host
/// unreachable) the stream carries exactly one fragment
/// `"Error: <message>"` so the caller can display it like any answer.
/// Failures after the first fragment arrive as `Err` items instead.
pub async fn build_rag_pipeline(
    chat: &dyn ChatModel,
    model_name: &str,
    context: &str,
    query: &str,
) -> ResponseStream {
    let prompt = render_prompt(context, query);
    debug!(model = model_name, prompt_len = prompt.len(), "prompt rendered");
    debug!("{}", prompt);

    match chat.stream_chat(model_name, &prompt).await {
        Ok(fragments) => fragments,
        Err(e) => {
            warn!(model = model_name, error = %e, "generation setup failed");
            error_stream(&e.to_string())
        }
    }
}

/// One-fragment stream carrying the error sentinel
pub fn error_stream(message: &str) -> ResponseStream {
    let sentinel = format!("{}{}", ERROR_SENTINEL_PREFIX, message);
    Box::pin(stream::iter(vec![Ok(sentinel)]))
}
