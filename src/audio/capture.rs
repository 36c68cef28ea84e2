//! Real audio capture using CPAL (Cross-Platform Audio Library).

use crate::audio::source::SampleSource;
use crate::error::{Result, SlatewireError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};

/// Run a closure with stderr temporarily redirected to /dev/null.
///
/// This suppresses noisy ALSA/JACK/PipeWire messages that CPAL triggers
/// when probing audio backends. The messages are harmless but confusing to users.
///
/// # Safety
/// Uses `libc::dup`/`libc::dup2` to save and restore file descriptor 2 (stderr).
/// Safe as long as no other thread is concurrently manipulating fd 2.
fn with_suppressed_stderr<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    unsafe {
        let saved_fd = libc::dup(2);
        let devnull = libc::open(c"/dev/null".as_ptr(), libc::O_WRONLY);
        if saved_fd >= 0 && devnull >= 0 {
            libc::dup2(devnull, 2);
            libc::close(devnull);
        }

        let result = f();

        if saved_fd >= 0 {
            libc::dup2(saved_fd, 2);
            libc::close(saved_fd);
        }

        result
    }
}

/// Suppress noisy JACK/ALSA error messages that occur during audio backend probing.
/// These are harmless but confusing to users.
///
/// # Safety
/// This modifies environment variables which is safe when called before spawning threads.
pub fn suppress_audio_warnings() {
    // SAFETY: Called at startup before any threads are spawned
    unsafe {
        std::env::set_var("JACK_NO_START_SERVER", "1");
        std::env::set_var("JACK_NO_AUDIO_RESERVATION", "1");
        std::env::set_var("PIPEWIRE_DEBUG", "0");
        std::env::set_var("ALSA_DEBUG", "0");
        std::env::set_var("PW_LOG", "0");
    }
}

/// Preferred device names for GNOME/PipeWire environments.
const PREFERRED_DEVICES: &[&str] = &["pipewire", "pulse", "PulseAudio"];

/// Device name patterns to filter out (not useful for voice input).
const FILTERED_PATTERNS: &[&str] = &[
    "surround",
    "front:",
    "rear:",
    "center:",
    "side:",
    "Digital Output",
    "HDMI",
    "S/PDIF",
];

/// Check if a device name should be filtered out.
fn should_filter_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    FILTERED_PATTERNS
        .iter()
        .any(|pattern| lower.contains(&pattern.to_lowercase()))
}

/// Check if a device is a preferred device.
fn is_preferred_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    PREFERRED_DEVICES
        .iter()
        .any(|pref| lower.contains(&pref.to_lowercase()))
}

/// List input devices usable for capture.
///
/// During enumeration, cpal may output ALSA/JACK warnings to stderr while
/// probing backends; these are harmless.
pub fn list_devices() -> Result<Vec<String>> {
    let (host, devices) = with_suppressed_stderr(|| {
        let host = cpal::default_host();
        let devices = host.input_devices();
        (host, devices)
    });
    let _ = host; // keep host alive while iterating devices
    let devices = devices.map_err(|e| SlatewireError::AudioCapture {
        message: format!("Failed to enumerate input devices: {}", e),
    })?;

    let mut device_names = Vec::new();
    for device in devices {
        if let Ok(name) = device.name() {
            if should_filter_device(&name) {
                continue;
            }
            if is_preferred_device(&name) {
                device_names.push(format!("{} [recommended]", name));
            } else {
                device_names.push(name);
            }
        }
    }

    Ok(device_names)
}

/// Get the best default input device, preferring PipeWire/PulseAudio.
fn get_best_default_device() -> Result<cpal::Device> {
    with_suppressed_stderr(|| {
        let host = cpal::default_host();

        if let Ok(devices) = host.input_devices() {
            for device in devices {
                if let Ok(name) = device.name()
                    && is_preferred_device(&name)
                {
                    return Ok(device);
                }
            }
        }

        host.default_input_device()
            .ok_or_else(|| SlatewireError::AudioDeviceNotFound {
                device: "default".to_string(),
            })
    })
}

/// Wrapper for cpal::Stream to make it Send.
///
/// SAFETY: The stream is only accessed from a single thread at a time
/// through the Mutex wrapper in CpalSampleSource.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

/// Live microphone capture at the device's native rate.
///
/// The capture callback appends normalized f32 samples to a shared buffer;
/// `read_chunk` drains it. Multi-channel input is mixed down to mono. No
/// resampling happens here; the session greeting declares the real rate
/// and the frame accumulator sizes its packets from it.
pub struct CpalSampleSource {
    device: cpal::Device,
    stream: Arc<Mutex<Option<SendableStream>>>,
    buffer: Arc<Mutex<Vec<f32>>>,
    sample_rate: u32,
    channels: usize,
}

impl CpalSampleSource {
    /// Create a capture source on the named device, or the best default.
    pub fn new(device_name: Option<&str>) -> Result<Self> {
        let device = with_suppressed_stderr(|| {
            let host = cpal::default_host();

            if let Some(name) = device_name {
                let devices = host
                    .input_devices()
                    .map_err(|e| SlatewireError::AudioCapture {
                        message: format!("Failed to enumerate devices: {}", e),
                    })?;

                let mut found_device = None;
                for dev in devices {
                    if let Ok(dev_name) = dev.name()
                        && dev_name == name
                    {
                        found_device = Some(dev);
                        break;
                    }
                }

                found_device.ok_or_else(|| SlatewireError::AudioDeviceNotFound {
                    device: name.to_string(),
                })
            } else {
                get_best_default_device()
            }
        })?;

        // Detect the device's native format up front so packet sizing and
        // the session greeting agree with what actually streams
        let default_config =
            device
                .default_input_config()
                .map_err(|e| SlatewireError::AudioCapture {
                    message: format!("Failed to query default input config: {}", e),
                })?;
        let sample_rate = default_config.sample_rate().0;
        let channels = default_config.channels() as usize;

        Ok(Self {
            device,
            stream: Arc::new(Mutex::new(None)),
            buffer: Arc::new(Mutex::new(Vec::new())),
            sample_rate,
            channels,
        })
    }

    /// Build the input stream at the device's native config.
    fn build_stream(&self) -> Result<cpal::Stream> {
        use cpal::SampleFormat;

        let default_config = self
            .device
            .default_input_config()
            .map_err(|e| SlatewireError::AudioCapture {
                message: format!("Failed to query default input config: {}", e),
            })?;
        let stream_config: cpal::StreamConfig = default_config.clone().into();
        let channels = self.channels;

        let err_callback = |err| {
            eprintln!("Audio stream error: {}", err);
        };

        let buffer = Arc::clone(&self.buffer);
        match default_config.sample_format() {
            SampleFormat::F32 => self
                .device
                .build_input_stream(
                    &stream_config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        if let Ok(mut buf) = buffer.lock() {
                            mix_to_mono(data, channels, &mut buf);
                        }
                    },
                    err_callback,
                    None,
                )
                .map_err(|e| SlatewireError::AudioCapture {
                    message: format!("Failed to build f32 stream: {}", e),
                }),
            SampleFormat::I16 => self
                .device
                .build_input_stream(
                    &stream_config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        let floats: Vec<f32> =
                            data.iter().map(|&s| s as f32 / 32768.0).collect();
                        if let Ok(mut buf) = buffer.lock() {
                            mix_to_mono(&floats, channels, &mut buf);
                        }
                    },
                    err_callback,
                    None,
                )
                .map_err(|e| SlatewireError::AudioCapture {
                    message: format!("Failed to build i16 stream: {}", e),
                }),
            other => Err(SlatewireError::AudioCapture {
                message: format!("Unsupported sample format: {:?}", other),
            }),
        }
    }
}

/// Average interleaved channels down to mono, appending to `out`.
fn mix_to_mono(data: &[f32], channels: usize, out: &mut Vec<f32>) {
    if channels <= 1 {
        out.extend_from_slice(data);
        return;
    }
    out.extend(
        data.chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32),
    );
}

impl SampleSource for CpalSampleSource {
    fn start(&mut self) -> Result<()> {
        let stream = self.build_stream()?;
        stream.play().map_err(|e| SlatewireError::AudioCapture {
            message: format!("Failed to start stream: {}", e),
        })?;

        let mut guard = self.stream.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(SendableStream(stream));
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        // Dropping the stream releases the capture device synchronously
        let mut guard = self.stream.lock().unwrap_or_else(|e| e.into_inner());
        *guard = None;

        let mut buf = self.buffer.lock().unwrap_or_else(|e| e.into_inner());
        buf.clear();
        Ok(())
    }

    fn read_chunk(&mut self) -> Result<Vec<f32>> {
        let mut buf = self.buffer.lock().unwrap_or_else(|e| e.into_inner());
        Ok(std::mem::take(&mut *buf))
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
