//! Speech capture
//!
//! Wraps a device or remote speech recognizer behind [`SpeechCaptureAdapter`],
//! which owns the exclusive [`Microphone`] hold for the lifetime of a capture
//! and guarantees every capture ends with exactly one terminal event.

pub mod adapter;
pub mod microphone;
pub mod nats;
pub mod recognizer;

pub use adapter::{CaptureEvent, CaptureFeed, CaptureId, SpeechCaptureAdapter};
pub use microphone::{Microphone, MicrophoneHold};
pub use nats::NatsRecognizer;
pub use recognizer::{RecognizerEvent, SpeechRecognizer};
