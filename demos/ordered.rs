//! # Example: ordered
//!
//! Three producers push onto three streams at different speeds; the output is
//! still interleaved round by round.
//!
//! Shows how to:
//! - Build a [`Synchronizer`] with the built-in [`LogWriter`] subscriber.
//! - Share the handle between producer tasks.
//! - Drain with `wait()` once every producer is done.
//!
//! ## Flow
//! ```text
//! producer 0 ──produce(0)──┐
//! producer 1 ──produce(1)──┼──► Coordinator ──► stdout: s0-0, s1-0, s2-0, s0-1, ...
//! producer 2 ──produce(2)──┘
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=lockstep=debug cargo run --example ordered --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use lockstep::{Config, LogWriter, Subscribe, SyncError, Synchronizer};
use tracing_subscriber::EnvFilter;

const ROUNDS: usize = 5;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let sync = Synchronizer::builder(Config::default())
        .with_subscribers(subs)
        .build()?;

    let producers: Vec<_> = (0..sync.streams())
        .map(|stream| {
            let sync = sync.clone();
            tokio::spawn(async move {
                // Later streams are slower; order is restored by the coordinator.
                let pause = Duration::from_millis(10 * (stream as u64 + 1));
                for k in 0..ROUNDS {
                    tokio::time::sleep(pause).await;
                    sync.produce(stream, format!("s{stream}-{k}"))?;
                }
                Ok::<_, SyncError>(())
            })
        })
        .collect();

    for p in producers {
        p.await??;
    }

    sync.wait().await?;
    println!("rounds emitted: {}", sync.rounds_emitted());
    Ok(())
}
