//! Audio device capture.

#[cfg(feature = "cpal-audio")]
pub mod capture;

#[cfg(feature = "cpal-audio")]
pub use capture::{CpalChunkSource, list_devices, suppress_audio_warnings};
