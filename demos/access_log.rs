//! # Example: access_log
//!
//! Reads an access log from stdin and prints request counts as a table.
//!
//! ## Run
//! ```bash
//! cat access.log | cargo run --example access_log
//! cat access.log | cargo run --example access_log -- --normalize
//! ```

use lockstep::access_log::{Grouping, count_requests_with, format_counts};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::io::Result<()> {
    let grouping = if std::env::args().any(|a| a == "--normalize") {
        Grouping::NormalizeIds
    } else {
        Grouping::Exact
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut records = Vec::new();
    while let Some(line) = lines.next_line().await? {
        records.push(line);
    }

    let counts = count_requests_with(&records, grouping);
    println!("{}", format_counts(&counts));
    Ok(())
}
