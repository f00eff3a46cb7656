//! OneBot v11 integration for Murmur.
//!
//! This crate turns raw OneBot traffic into chat memory:
//!
//! - [`OneBotMessageEvent`] parses pushed `message` events.
//! - [`OneBotEventListener`] routes those events into a [`ChatMemory`](murmur_memory::ChatMemory).
//! - [`OneBotHistoryClient`] pulls past messages over the HTTP API.
//! - [`HistoryRefresher`] merges fetched history back into memory.
//!
//! Connection lifecycle (websocket setup, reconnects) belongs to the bot
//! runtime and is not handled here.

mod config;
mod event;
mod history;
mod listener;
mod refresh;
mod segments;

pub use config::OneBotConfig;
pub use event::OneBotMessageEvent;
pub use history::{history_request, parse_history_response, OneBotHistoryClient};
pub use listener::OneBotEventListener;
pub use refresh::HistoryRefresher;
pub use segments::{
    format_history_message, format_segments, friend_sender_name, group_sender_name,
    segment_placeholder,
};
