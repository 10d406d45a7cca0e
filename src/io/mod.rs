//! I/O module
//!
//! Handles report output and directory listing input.
//!
//! # Components
//!
//! - `csv_format` - CSV serialization of final account balances
//! - `listing` - `ls -l` listing consumer and pipe runner

pub mod csv_format;
pub mod listing;

pub use csv_format::write_balances_csv;
pub use listing::{consume_listing, parse_listing_line, run_listing, FileEntry, ListingSummary};
