//! Dispatch lifecycle controller.
//!
//! Runs one goal pipeline per UI command and emits events for presentation layers.

use super::pipeline::send_goal;
use crate::dispatch::{GoalDispatcher, TransportClient};
use crate::model::{DispatchReport, GoalRequest};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Commands emitted by UI layers.
#[derive(Debug, Clone)]
pub(crate) enum UiCommand {
    Send(GoalRequest),
    Quit,
}

/// Events sent back to UI layers.
#[derive(Debug, Clone)]
pub(crate) enum DispatchEvent {
    Dispatching,
    Completed(Box<DispatchReport>),
    Info(String),
}

/// Process UI commands until the UI quits or drops its sender.
///
/// Commands are handled strictly in order, so at most one dispatch is in
/// flight. The spawn itself runs on the blocking pool to keep process creation
/// off the async workers.
pub(crate) async fn run_controller<T>(
    dispatcher: Arc<GoalDispatcher<T>>,
    dry_run: bool,
    event_tx: UnboundedSender<DispatchEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()>
where
    T: TransportClient + 'static,
{
    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            UiCommand::Send(request) => {
                let _ = event_tx.send(DispatchEvent::Dispatching);
                let d = dispatcher.clone();
                match tokio::task::spawn_blocking(move || send_goal(&*d, &request, dry_run)).await
                {
                    Ok(report) => {
                        let _ = event_tx.send(DispatchEvent::Completed(Box::new(report)));
                    }
                    Err(e) => {
                        tracing::error!("dispatch task failed: {e}");
                        let _ = event_tx.send(DispatchEvent::Info(format!(
                            "Dispatch task failed: {e}"
                        )));
                    }
                }
            }
            UiCommand::Quit => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::tests::RecordingTransport;
    use crate::model::DispatchOutcome;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn sends_in_order_and_stops_on_quit() {
        let dispatcher = Arc::new(GoalDispatcher::new(
            "/t",
            "pkg/Type",
            RecordingTransport::default(),
        ));
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();

        cmd_tx
            .send(UiCommand::Send(GoalRequest::new("map1", 1.0, 2.0)))
            .unwrap();
        cmd_tx
            .send(UiCommand::Send(GoalRequest::new("", 0.0, 0.0)))
            .unwrap();
        cmd_tx.send(UiCommand::Quit).unwrap();

        run_controller(dispatcher.clone(), false, event_tx, cmd_rx)
            .await
            .unwrap();

        let mut outcomes = Vec::new();
        while let Ok(ev) = event_rx.try_recv() {
            if let DispatchEvent::Completed(report) = ev {
                outcomes.push(report.outcome);
            }
        }
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0], DispatchOutcome::Sent);
        assert!(!outcomes[1].is_sent());
        assert_eq!(dispatcher.transport().call_count(), 1);
    }

    #[tokio::test]
    async fn exits_when_ui_drops_sender() {
        let dispatcher = Arc::new(GoalDispatcher::new(
            "/t",
            "pkg/Type",
            RecordingTransport::default(),
        ));
        let (event_tx, _event_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();
        drop(cmd_tx);
        assert!(run_controller(dispatcher, false, event_tx, cmd_rx)
            .await
            .is_ok());
    }
}
