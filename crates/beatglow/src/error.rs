//! Error types for capture and GPU post-processing.

use std::time::Duration;
use thiserror::Error;

/// Failures while binding a capture device. Never fatal: analysis keeps
/// running on the previous source or the synthetic spectrum.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("no audio device with id '{0}'")]
    UnknownDevice(String),

    #[error("could not read config for '{device}': {reason}")]
    Config { device: String, reason: String },

    #[error("'{device}' did not report a config within {timeout:?}")]
    Timeout { device: String, timeout: Duration },

    #[error("failed to open stream on '{device}': {source}")]
    BuildStream {
        device: String,
        #[source]
        source: cpal::BuildStreamError,
    },

    #[error("failed to start stream on '{device}': {source}")]
    PlayStream {
        device: String,
        #[source]
        source: cpal::PlayStreamError,
    },

    #[error("capture worker disappeared before answering")]
    WorkerGone,
}

/// Failures detected while setting up or driving the post-processing passes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PostError {
    #[error("pass recorded outside of a frame")]
    NoFrame,

    #[error("{pass} shader failed to compile: {message}")]
    ShaderCompile { pass: &'static str, message: String },

    #[error("failed to create {0}")]
    ResourceCreation(&'static str),

    #[error("unknown {kind} handle {id}")]
    UnknownHandle { kind: &'static str, id: u32 },
}

pub type CaptureResult<T> = std::result::Result<T, CaptureError>;
pub type PostResult<T> = std::result::Result<T, PostError>;
