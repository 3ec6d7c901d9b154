//! # MTG Meta Tracker
//!
//! A tournament metagame tracker for mtgtop8 data.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (decks, events, card metadata)
//! - **scrape**: mtgtop8 HTML scraping and page parsers
//! - **analysis**: Metagame statistics and deck composition
//! - **cards**: Scryfall metadata lookup with a disk cache
//! - **storage**: JSON persistence and the in-memory deck repository
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod analysis;
pub mod api;
pub mod cards;
pub mod config;
pub mod models;
pub mod scrape;
pub mod storage;

pub use models::*;
