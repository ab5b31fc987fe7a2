mod analyzer;
mod beat;
mod engine;
mod fft;
mod source_pipe;
mod spectrum;

pub use engine::AudioEngine;
pub use source_pipe::{enumerate_devices, DeviceInfo};
