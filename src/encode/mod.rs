//! Encoding sinks: the `FrameSink` contract, the `ffmpeg` MP4 sink, and the
//! in-memory test sink.

/// MP4 encoding through a spawned `ffmpeg` subprocess.
pub mod ffmpeg;
/// The sink contract and the in-memory implementation.
pub mod sink;
