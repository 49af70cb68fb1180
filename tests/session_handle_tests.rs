mod common;

use common::{default_harness, reply_for, FakeAgent};
use smartcrop_chat::session::spawn;
use smartcrop_chat::{CaptureState, SessionError};

#[tokio::test]
async fn test_handle_round_trip() {
    let h = default_harness(FakeAgent::instant());
    let microphone = h.microphone.clone();
    let session = spawn(h.controller);

    session.submit_text("hello").await.unwrap();
    let snapshot = session
        .wait_for(|s| !s.awaiting_reply && s.state == CaptureState::Idle)
        .await
        .unwrap();

    assert_eq!(snapshot.turns.len(), 3);
    assert_eq!(snapshot.turns[2].text, reply_for("hello"));

    let stats = session.stats().await.unwrap();
    assert_eq!(stats.dispatches, 1);
    assert_eq!(stats.turns_count, 3);
    assert!(!microphone.is_held());
}

#[tokio::test]
async fn test_handle_reports_rejections() {
    let (agent, gate) = FakeAgent::gated();
    let session = spawn(default_harness(agent).controller);

    session.submit_text("one").await.unwrap();
    assert!(session.snapshot().awaiting_reply);
    assert_eq!(
        session.submit_text("two").await,
        Err(SessionError::DispatchInFlight)
    );

    gate.add_permits(1);
    session.wait_for(|s| !s.awaiting_reply).await.unwrap();
    assert_eq!(session.snapshot().turns.len(), 3);
}

#[tokio::test]
async fn test_dropping_handles_releases_microphone() {
    let h = default_harness(FakeAgent::instant());
    let microphone = h.microphone.clone();
    let session = spawn(h.controller);

    session.start_capture().await.unwrap();
    assert!(microphone.is_held());

    let clone = session.clone();
    drop(session);
    assert!(clone.snapshot().state == CaptureState::Recording);
    drop(clone);

    for _ in 0..100 {
        if !microphone.is_held() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert!(!microphone.is_held());
    assert_eq!(microphone.releases(), 1);
}
