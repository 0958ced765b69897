//! Shared turn execution for the REPL and the one-shot `classify` command
//!
//! Drains a response stream through a [`StreamingTurn`], notifying an
//! observer after every fragment so the caller can render progressively.

use futures_util::StreamExt;
use tracing::warn;

use crate::errors::Result;
use crate::rag::ResponseStream;
use crate::repl::turn::StreamingTurn;

/// Receives turn progress while a response streams in
pub trait TurnObserver {
    /// Called once, before the first fragment is read
    fn on_start(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called after each fragment is absorbed
    fn on_update(&mut self, turn: &StreamingTurn) -> Result<()>;

    /// Called once, after the turn reached a terminal state
    fn on_end(&mut self, turn: &StreamingTurn) -> Result<()>;
}

/// Consume `stream` to the end.
///
/// A mid-stream `Err` aborts the turn; the partial content is kept and the
/// turn is returned, not the error.
pub async fn stream_turn(
    mut stream: ResponseStream,
    observer: &mut dyn TurnObserver,
) -> Result<StreamingTurn> {
    let mut turn = StreamingTurn::new();
    turn.start()?;
    observer.on_start()?;

    while let Some(item) = stream.next().await {
        match item {
            Ok(fragment) => {
                turn.push(&fragment)?;
                observer.on_update(&turn)?;
            }
            Err(e) => {
                warn!(error = %e, received = turn.content().len(), "response stream failed");
                turn.fail(e.to_string())?;
                break;
            }
        }
    }

    if !turn.state().is_terminal() {
        turn.finish()?;
    }
    observer.on_end(&turn)?;

    Ok(turn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ClassifierError;
    use crate::repl::turn::TurnState;
    use futures_util::stream;

    #[derive(Default)]
    struct Recorder {
        updates: Vec<String>,
        ended: Option<TurnState>,
    }

    impl TurnObserver for Recorder {
        fn on_update(&mut self, turn: &StreamingTurn) -> Result<()> {
            self.updates.push(turn.visible().to_string());
            Ok(())
        }

        fn on_end(&mut self, turn: &StreamingTurn) -> Result<()> {
            self.ended = Some(turn.state());
            Ok(())
        }
    }

    fn fragments(items: Vec<Result<String>>) -> ResponseStream {
        Box::pin(stream::iter(items))
    }

    #[tokio::test]
    async fn test_complete_turn() {
        let mut recorder = Recorder::default();
        let turn = stream_turn(
            fragments(vec![Ok("- L1: ".into()), Ok("Power".into())]),
            &mut recorder,
        )
        .await
        .unwrap();

        assert_eq!(turn.state(), TurnState::Complete);
        assert_eq!(turn.visible(), "- L1: Power");
        assert_eq!(recorder.updates, vec!["- L1:", "- L1: Power"]);
        assert_eq!(recorder.ended, Some(TurnState::Complete));
    }

    #[tokio::test]
    async fn test_mid_stream_failure_aborts() {
        let mut recorder = Recorder::default();
        let turn = stream_turn(
            fragments(vec![
                Ok("- L1: Po".into()),
                Err(ClassifierError::StreamingError("connection reset".into())),
                Ok("never seen".into()),
            ]),
            &mut recorder,
        )
        .await
        .unwrap();

        assert_eq!(turn.state(), TurnState::Aborted);
        assert_eq!(turn.content(), "- L1: Po");
        assert!(turn.error().unwrap().contains("connection reset"));
        assert_eq!(recorder.ended, Some(TurnState::Aborted));
    }

    #[tokio::test]
    async fn test_empty_stream_completes() {
        let mut recorder = Recorder::default();
        let turn = stream_turn(fragments(vec![]), &mut recorder).await.unwrap();
        assert_eq!(turn.state(), TurnState::Complete);
        assert!(recorder.updates.is_empty());
    }
}
