//! The log source seam used by the stream controller

use logmon_core::prelude::*;
use logmon_core::PriorityCode;
use tokio::sync::mpsc;

/// Default capacity of the bounded line queue between reader and consumer
pub const DEFAULT_LINE_BUFFER: usize = 1024;

/// What the controller asks a source to emit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRequest {
    /// Restrict output to this app's process, when it is running
    pub app_package: Option<String>,
    /// Lowest priority letter the source should emit
    pub min_priority: PriorityCode,
}

impl SourceRequest {
    pub fn new(app_package: Option<String>, min_priority: PriorityCode) -> Self {
        Self {
            app_package,
            min_priority,
        }
    }
}

/// Items delivered by a running source. Channel close means end of stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    /// One line of output, without its line terminator
    Line(String),
    /// Reading failed; no further lines will follow
    ReadFailed(String),
}

/// A producer of log lines, in emission order, that can be terminated.
///
/// The reader side only moves raw lines across the channel; all parsing and
/// aggregation happens in the consumer.
#[trait_variant::make(LogSource: Send)]
pub trait LocalLogSource {
    /// Discard history buffered by the source before streaming
    async fn clear(&mut self) -> Result<()>;

    /// Launch the source and return the receiving end of its line queue
    async fn start(&mut self, request: &SourceRequest) -> Result<mpsc::Receiver<SourceEvent>>;

    /// Stop the source; returns once the underlying process is gone
    async fn terminate(&mut self) -> Result<()>;
}
