//! # Round emitter.
//!
//! Writes one completed round to the sink: one item per line, newline-terminated,
//! in stream order. The whole round goes out as a single `write_all` followed by a
//! flush, so two rounds never interleave in the sink.

use std::io;

use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Boxed output destination.
pub type BoxSink = Box<dyn AsyncWrite + Send + Unpin>;

pub(crate) struct Emitter {
    sink: BoxSink,
    line_buf: Vec<u8>,
}

impl Emitter {
    pub(crate) fn new(sink: BoxSink) -> Self {
        Self {
            sink,
            line_buf: Vec::new(),
        }
    }

    pub(crate) async fn emit(&mut self, round: &[String]) -> io::Result<()> {
        self.line_buf.clear();
        for item in round {
            self.line_buf.extend_from_slice(item.as_bytes());
            self.line_buf.push(b'\n');
        }
        self.sink.write_all(&self.line_buf).await?;
        self.sink.flush().await
    }
}
