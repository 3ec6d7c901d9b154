//! Pure metagame statistics over deck collections.
//!
//! - Commander/archetype distributions and weighted card play rates
//! - Player leaderboard
//! - Per-deck and per-archetype composition breakdowns
//! - Card synergy pairs, deck similarity, duplicate detection
//! - The composed metagame report
//!
//! Everything in this module is synchronous and I/O free. Functions never
//! fail: empty input produces empty output, and missing metadata degrades
//! to documented fallbacks. Response structs serialize directly onto the
//! wire, so their field names are load-bearing.

mod cards;
mod composition;
mod distribution;
mod duplicates;
mod lands;
mod leaderboard;
mod report;
mod scoring;
mod similarity;
mod synergy;

pub use cards::*;
pub use composition::*;
pub use distribution::*;
pub use duplicates::*;
pub use lands::*;
pub use leaderboard::*;
pub use report::*;
pub use scoring::*;
pub use similarity::*;
pub use synergy::*;

/// Round to one decimal, the precision all percentages and scores use.
pub(crate) fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
