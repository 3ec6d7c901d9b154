//! Core data models for the metagame tracker.

mod cards;
mod dates;
mod deck;
mod event;

pub use cards::*;
pub use dates::*;
pub use deck::*;
pub use event::*;
