//! Audio device capture and stream management.
//!
//! Handles audio input from system devices using cpal: device enumeration,
//! asynchronous connection, and a ring buffer of the most recent mono samples.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{CaptureError, CaptureResult};

/// A capture source as presented to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Stable within a session: `in:<name>` or `out:<name>`
    pub id: String,
    pub label: String,
    /// Monitor or loopback source (captures what the system is playing)
    pub is_monitor: bool,
    pub is_input: bool,
}

impl DeviceInfo {
    fn new(name: String, is_input: bool) -> Self {
        let prefix = if is_input { "in" } else { "out" };
        Self {
            id: format!("{}:{}", prefix, name),
            is_monitor: !is_input || is_monitor_label(&name),
            label: name,
            is_input,
        }
    }
}

pub fn is_monitor_label(label: &str) -> bool {
    label.to_lowercase().contains("monitor")
}

/// Monitor sources first; original order otherwise.
pub fn sort_devices(devices: &mut [DeviceInfo]) {
    devices.sort_by_key(|d| !d.is_monitor);
}

fn collect_devices() -> Vec<(DeviceInfo, Device)> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    match host.input_devices() {
        Ok(inputs) => {
            for device in inputs {
                if let Ok(name) = device.name() {
                    devices.push((DeviceInfo::new(name, true), device));
                }
            }
        }
        Err(e) => warn!("Could not list input devices: {}", e),
    }

    // Output devices can be captured as loopback on hosts that support it
    if let Ok(outputs) = host.output_devices() {
        for device in outputs {
            if let Ok(name) = device.name() {
                devices.push((DeviceInfo::new(name, false), device));
            }
        }
    }

    devices
}

/// List capture sources, monitor sources first.
pub fn enumerate_devices() -> Vec<DeviceInfo> {
    let mut devices: Vec<DeviceInfo> = collect_devices()
        .into_iter()
        .map(|(info, _)| info)
        .collect();
    sort_devices(&mut devices);
    devices
}

/// Mix interleaved frames down to mono and append, keeping at most `capacity`.
fn push_mono(ring: &mut VecDeque<f32>, data: &[f32], channels: usize, capacity: usize) {
    let channels = channels.max(1);
    for chunk in data.chunks(channels) {
        let sample = chunk.iter().sum::<f32>() / chunk.len() as f32;
        if ring.len() == capacity {
            ring.pop_front();
        }
        ring.push_back(sample);
    }
}

/// Result of a background config query
struct ConfigOutcome {
    request: u64,
    info: DeviceInfo,
    device: Device,
    config: CaptureResult<StreamConfig>,
}

pub struct SourcePipe {
    buffer: Arc<Mutex<VecDeque<f32>>>,
    capacity: usize,
    stream: Option<Stream>,
    current: Option<DeviceInfo>,
    timeout: Duration,
    outcomes_tx: Sender<ConfigOutcome>,
    outcomes_rx: Receiver<ConfigOutcome>,
    next_request: u64,
    in_flight: usize,
}

impl SourcePipe {
    /// `capacity` is the number of mono samples kept (the FFT size).
    pub fn new(capacity: usize, timeout: Duration) -> Self {
        let (outcomes_tx, outcomes_rx) = mpsc::channel();
        Self {
            buffer: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
            stream: None,
            current: None,
            timeout,
            outcomes_tx,
            outcomes_rx,
            next_request: 0,
            in_flight: 0,
        }
    }

    pub fn current(&self) -> Option<&DeviceInfo> {
        self.current.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    pub fn is_connecting(&self) -> bool {
        self.in_flight > 0
    }

    /// Start connecting to `id`.
    ///
    /// Querying a device's config can hang on broken drivers, so it runs on a
    /// helper thread bounded by the configured timeout. The outcome is applied
    /// by [`poll`](Self::poll). Overlapping requests resolve in completion
    /// order; the last one to finish wins.
    pub fn connect(&mut self, id: &str) -> CaptureResult<()> {
        let (info, device) = collect_devices()
            .into_iter()
            .find(|(info, _)| info.id == id)
            .ok_or_else(|| CaptureError::UnknownDevice(id.to_string()))?;

        let request = self.next_request;
        self.next_request += 1;
        self.in_flight += 1;
        info!("[{}] Connecting: {}", request, info.label);

        let timeout = self.timeout;
        let tx = self.outcomes_tx.clone();
        std::thread::spawn(move || {
            let config = Self::get_config_with_timeout(&device, &info, timeout);
            let _ = tx.send(ConfigOutcome {
                request,
                info,
                device,
                config,
            });
        });

        Ok(())
    }

    /// Get device config with timeout (the config call often hangs on bad devices)
    fn get_config_with_timeout(
        device: &Device,
        info: &DeviceInfo,
        timeout: Duration,
    ) -> CaptureResult<StreamConfig> {
        let device_clone = device.clone();
        let is_input = info.is_input;
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || {
            let config = if is_input {
                device_clone.default_input_config()
            } else {
                device_clone.default_output_config()
            };
            let _ = tx.send(config);
        });

        match rx.recv_timeout(timeout) {
            Ok(Ok(config)) => Ok(config.into()),
            Ok(Err(e)) => Err(CaptureError::Config {
                device: info.label.clone(),
                reason: e.to_string(),
            }),
            Err(mpsc::RecvTimeoutError::Timeout) => Err(CaptureError::Timeout {
                device: info.label.clone(),
                timeout,
            }),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(CaptureError::WorkerGone),
        }
    }

    /// Apply any finished connection attempts, in the order they finished.
    pub fn poll(&mut self) -> Vec<CaptureResult<DeviceInfo>> {
        let mut results = Vec::new();
        while let Ok(outcome) = self.outcomes_rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            let ConfigOutcome {
                request,
                info,
                device,
                config,
            } = outcome;

            match config.and_then(|config| self.start_stream(&device, &info, &config)) {
                Ok(()) => {
                    info!("[{}] Connected: {}", request, info.label);
                    self.current = Some(info.clone());
                    results.push(Ok(info));
                }
                Err(e) => {
                    warn!("[{}] Connection failed: {}", request, e);
                    results.push(Err(e));
                }
            }
        }
        results
    }

    fn start_stream(
        &mut self,
        device: &Device,
        info: &DeviceInfo,
        config: &StreamConfig,
    ) -> CaptureResult<()> {
        let channels = config.channels as usize;
        let capacity = self.capacity;
        let ring = Arc::clone(&self.buffer);

        let err_fn = |err| warn!("Audio stream error: {}", err);

        let stream = device
            .build_input_stream(
                config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut ring) = ring.lock() {
                        push_mono(&mut ring, data, channels, capacity);
                    }
                },
                err_fn,
                None,
            )
            .map_err(|source| CaptureError::BuildStream {
                device: info.label.clone(),
                source,
            })?;

        stream.play().map_err(|source| CaptureError::PlayStream {
            device: info.label.clone(),
            source,
        })?;

        // Old stream stops when dropped; stale samples would smear into the new source
        self.stream = Some(stream);
        self.clear();
        Ok(())
    }

    /// Drop the stream and forget the device.
    pub fn disconnect(&mut self) {
        if let Some(info) = self.current.take() {
            info!("Disconnected: {}", info.label);
        }
        self.stream = None;
        self.clear();
    }

    fn clear(&self) {
        if let Ok(mut ring) = self.buffer.lock() {
            ring.clear();
        }
    }

    /// Copy the most recent samples into `out`, oldest first.
    pub fn snapshot(&self, out: &mut Vec<f32>) {
        out.clear();
        if let Ok(ring) = self.buffer.lock() {
            out.extend(ring.iter().copied());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(label: &str, is_input: bool) -> DeviceInfo {
        DeviceInfo::new(label.to_string(), is_input)
    }

    #[test]
    fn test_monitor_detection() {
        assert!(is_monitor_label("Monitor of Built-in Audio"));
        assert!(is_monitor_label("alsa_output.pci.monitor"));
        assert!(!is_monitor_label("USB Microphone"));
        assert!(device("Speakers", false).is_monitor);
        assert!(!device("Mic", true).is_monitor);
    }

    #[test]
    fn test_ids_distinguish_direction() {
        assert_eq!(device("pulse", true).id, "in:pulse");
        assert_eq!(device("pulse", false).id, "out:pulse");
    }

    #[test]
    fn test_monitor_sources_sort_first() {
        let mut devices = vec![
            device("Mic A", true),
            device("Monitor of Speakers", true),
            device("Mic B", true),
            device("HDMI", false),
        ];
        sort_devices(&mut devices);
        let labels: Vec<&str> = devices.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, ["Monitor of Speakers", "HDMI", "Mic A", "Mic B"]);
    }

    #[test]
    fn test_push_mono_mixes_and_bounds() {
        let mut ring = VecDeque::new();
        push_mono(&mut ring, &[1.0, 0.0, 0.5, 0.5, -1.0, -1.0], 2, 2);
        assert_eq!(ring.len(), 2);
        assert_eq!(ring[0], 0.5);
        assert_eq!(ring[1], -1.0);
    }

    #[test]
    fn test_unknown_device_is_rejected() {
        let mut pipe = SourcePipe::new(512, Duration::from_millis(10));
        let err = pipe.connect("in:definitely-not-a-device").unwrap_err();
        assert!(err.to_string().contains("definitely-not-a-device"));
        assert!(!pipe.is_connecting());
        assert!(pipe.poll().is_empty());
    }

    #[test]
    fn test_disconnect_clears_samples() {
        let mut pipe = SourcePipe::new(4, Duration::from_millis(10));
        if let Ok(mut ring) = pipe.buffer.lock() {
            push_mono(&mut ring, &[0.25, 0.5], 1, 4);
        }
        let mut out = Vec::new();
        pipe.snapshot(&mut out);
        assert_eq!(out, vec![0.25, 0.5]);

        pipe.disconnect();
        pipe.snapshot(&mut out);
        assert!(out.is_empty());
        assert!(!pipe.is_connected());
    }
}
