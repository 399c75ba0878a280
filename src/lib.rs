//! Finder Bot: questionnaire-driven people search over Messenger.

pub mod bot;
pub mod config;
pub mod dialog;
pub mod error;
pub mod messenger;
pub mod search;
pub mod setup;
pub mod webhook;
