//! Route handlers grouped by resource.

pub mod auth;
pub mod cards;
pub mod data;
pub mod decks;
pub mod events;
pub mod metagame;
pub mod players;
pub mod scrape;
pub mod settings;
