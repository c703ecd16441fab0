//! An HTTP relay that forwards message text to the Telegram Bot API.
//!
//! Every attempted delivery is recorded in an append-only SQLite log, which
//! can be read back newest-first through the history endpoint.

use std::sync::Arc;

use crate::clock::LocalClock;
use crate::config::AppConfig;
use crate::store::LogStore;
use crate::telegram::TelegramClient;

pub mod api;
pub mod clock;
pub mod config;
pub mod entity;
pub mod error;
pub mod relay;
pub mod response;
pub mod store;
pub mod telegram;

#[derive(Clone, Debug)]
pub struct AppResources {
    pub store: LogStore,
    pub telegram: Arc<TelegramClient>,
    pub config: Arc<AppConfig>,
    pub clock: LocalClock,
}
