//! # Access-log request counting.
//!
//! Parses web server access-log records, counts requests per
//! `(method, endpoint, status)` and renders the counts as a table.
//!
//! Record format:
//! ```text
//! [02/Nov/2018:21:46:31 +0000] PUT /users/12345/locations HTTP/1.1 204 iphone-3
//! [DD/Mon/YYYY:HH:MM:SS +ZZZZ] METHOD URI HTTP/1.1 STATUS USER_AGENT
//! ```
//!
//! ## Example
//! ```rust
//! use lockstep::access_log::{Grouping, count_requests_with, format_counts};
//!
//! let log = [
//!     "[02/Nov/2018:21:46:31 +0000] PUT /users/12345/locations HTTP/1.1 204 iphone-3",
//!     "[02/Nov/2018:21:46:31 +0000] PUT /users/6098/locations HTTP/1.1 204 iphone-3",
//!     "not a record",
//! ];
//! let counts = count_requests_with(log, Grouping::NormalizeIds);
//! assert_eq!(counts.len(), 1);
//! assert_eq!(counts[0].key.endpoint, "/users/#/locations");
//! assert_eq!(counts[0].count, 2);
//!
//! println!("{}", format_counts(&counts));
//! ```

mod parse;
mod table;

pub use parse::{
    Grouping, ParseError, RequestCount, RequestKey, count_requests, count_requests_with,
    parse_line, parse_log,
};
pub use table::format_counts;
