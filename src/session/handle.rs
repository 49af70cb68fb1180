use super::controller::SessionController;
use super::event::{Notice, SessionEvent};
use super::stats::{SessionSnapshot, SessionStats};
use crate::error::SessionError;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{info, warn};

enum Command {
    Apply {
        event: SessionEvent,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    TakeNotices {
        reply: oneshot::Sender<Vec<Notice>>,
    },
    Stats {
        reply: oneshot::Sender<SessionStats>,
    },
}

/// Cloneable handle to a running session
///
/// Renderers send user gestures through it and observe the session as
/// read-only snapshots. The session shuts down (releasing the microphone)
/// once every handle is dropped.
#[derive(Clone)]
pub struct SessionHandle {
    session_id: String,
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

/// Run the controller on its own task and return a handle to it
pub fn spawn(controller: SessionController) -> SessionHandle {
    let session_id = controller.session_id().to_string();
    let (commands_tx, commands_rx) = mpsc::channel(32);
    let (snapshots_tx, snapshots_rx) = watch::channel(controller.snapshot());

    tokio::spawn(run(controller, commands_rx, snapshots_tx));

    SessionHandle {
        session_id,
        commands: commands_tx,
        snapshots: snapshots_rx,
    }
}

async fn run(
    mut controller: SessionController,
    mut commands: mpsc::Receiver<Command>,
    snapshots: watch::Sender<SessionSnapshot>,
) {
    info!("Session {} loop started", controller.session_id());

    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else { break };
                match command {
                    Command::Apply { event, reply } => {
                        let result = controller.handle(event).await;
                        // Callers read the snapshot right after the reply
                        snapshots.send_replace(controller.snapshot());
                        let _ = reply.send(result);
                    }
                    Command::TakeNotices { reply } => {
                        let _ = reply.send(controller.take_notices());
                    }
                    Command::Stats { reply } => {
                        let _ = reply.send(controller.stats());
                    }
                }
            }
            Some(event) = controller.next_internal() => {
                if let Err(e) = controller.handle(event).await {
                    warn!("Session {} dropped internal event: {}", controller.session_id(), e);
                }
            }
        }

        snapshots.send_replace(controller.snapshot());
    }

    controller.shutdown().await;
    info!("Session {} loop stopped", controller.session_id());
}

impl SessionHandle {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn submit_text(&self, text: impl Into<String>) -> Result<(), SessionError> {
        self.apply(SessionEvent::SubmitText(text.into())).await
    }

    pub async fn start_capture(&self) -> Result<(), SessionError> {
        self.apply(SessionEvent::StartCapture).await
    }

    pub async fn release_capture(&self) -> Result<(), SessionError> {
        self.apply(SessionEvent::ReleaseCapture).await
    }

    pub async fn reset(&self) -> Result<(), SessionError> {
        self.apply(SessionEvent::Reset).await
    }

    async fn apply(&self, event: SessionEvent) -> Result<(), SessionError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Apply { event, reply })
            .await
            .map_err(|_| SessionError::SessionClosed)?;
        rx.await.map_err(|_| SessionError::SessionClosed)?
    }

    /// Drain notices not yet shown to the user
    pub async fn take_notices(&self) -> Result<Vec<Notice>, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::TakeNotices { reply })
            .await
            .map_err(|_| SessionError::SessionClosed)?;
        rx.await.map_err(|_| SessionError::SessionClosed)
    }

    pub async fn stats(&self) -> Result<SessionStats, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Stats { reply })
            .await
            .map_err(|_| SessionError::SessionClosed)?;
        rx.await.map_err(|_| SessionError::SessionClosed)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Wait until the snapshot satisfies `ready`
    pub async fn wait_for<F>(&self, mut ready: F) -> Result<SessionSnapshot, SessionError>
    where
        F: FnMut(&SessionSnapshot) -> bool,
    {
        let mut snapshots = self.snapshots.clone();
        let snapshot = snapshots
            .wait_for(|s| ready(s))
            .await
            .map_err(|_| SessionError::SessionClosed)?;
        Ok(snapshot.clone())
    }
}
