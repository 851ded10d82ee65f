//! Unix-style views over the catalog: `grep`, `find` and `rg`.
//!
//! grep and find walk the record store ([`scan::FlatScan`]); rg replays
//! a ranked index query ([`scan::RankedScan`]). Both feed the same line
//! matcher and collector.

pub mod find;
pub mod grep;
pub mod ripgrep;
pub mod scan;
pub mod size;

pub use find::{find, FindOptions};
pub use grep::{grep, GrepOptions};
pub use ripgrep::{ripgrep, RipgrepOptions};
pub use scan::{FlatScan, RankedScan, ScanStats, ScanStrategy};
pub use size::SizeFilter;
