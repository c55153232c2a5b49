//! Realtime streaming transcription.
//!
//! One dedicated loop owns the input device and the rolling buffer:
//! ```text
//! ┌────────────┐  fixed-size  ┌─────────────────┐  partial   ┌──────────┐
//! │ ChunkSource│─────────────▶│ Incremental     │───────────▶│ LineSink │
//! │ (mic/wav)  │   chunks     │ Transcriber     │  results   │ (stdout) │
//! └────────────┘              │ (rolling buffer)│            └──────────┘
//!                             └─────────────────┘
//! ```
//! Capture and processing are deliberately synchronous on one thread: a
//! chunk is read (blocking), inserted, processed, and only then is the
//! next chunk read. A higher-throughput redesign would decouple capture
//! and processing with a bounded queue.

pub mod buffer;
pub mod session;
pub mod sink;
pub mod source;
pub mod transcriber;

pub use buffer::RollingAudioBuffer;
pub use session::{SessionState, StopHandle, StreamingConfig, StreamingSession, TaskMode};
pub use sink::{CollectorLineSink, LineSink, StdoutLineSink};
pub use source::{ChunkSource, MockChunkSource};
pub use transcriber::{
    IncrementalTranscriber, OnlineTranscriber, OnlineTranscriberConfig, PartialResult,
};
