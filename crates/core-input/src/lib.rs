//! Async input service: crossterm terminal events → `core_events::Event`.

mod async_service;
mod key_token;

pub use async_service::AsyncInputShutdown;
pub use key_token::translate_key;

use async_service::spawn_async_event_task;

use core_events::{Event, KeyModifiers};
use crossterm::event::KeyModifiers as CMods;
use tokio::task::JoinHandle;

#[inline]
pub(crate) fn log_paste(text: &str) {
    tracing::trace!(target: "input.paste", len = text.chars().count(), "paste_event");
}

/// Spawn the async input service backed by `crossterm::EventStream`.
///
/// Returns the `JoinHandle` for the background task alongside a shutdown handle
/// that can be used to request immediate termination.
pub fn spawn_async_input(
    sender: tokio::sync::mpsc::Sender<Event>,
) -> (JoinHandle<()>, AsyncInputShutdown) {
    spawn_async_event_task(sender)
}

pub(crate) fn map_mods(m: CMods) -> KeyModifiers {
    let mut out = KeyModifiers::empty();
    if m.contains(CMods::CONTROL) {
        out |= KeyModifiers::CTRL;
    }
    if m.contains(CMods::ALT) {
        out |= KeyModifiers::ALT;
    }
    if m.contains(CMods::SHIFT) {
        out |= KeyModifiers::SHIFT;
    }
    out
}
