//! Hardware seam for audio capture.
//!
//! [`AudioCapture`](crate::audio::AudioCapture) never talks to the driver
//! directly; it hands a block callback to a [`CaptureBackend`]. The production
//! backend wraps a CPAL input stream, tests substitute a fake that calls the
//! callback by hand.

use crate::{CoreError, CoreResult};

use std::panic::Location;

use cpal::{
    Device, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{error, info, instrument, warn};

/// Callback invoked once per hardware buffer with mono samples.
pub type BlockCallback = Box<dyn FnMut(&[f32]) + Send + 'static>;

/// Format of the blocks a backend delivers after down-mixing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFormat {
    /// Sample rate of the delivered mono blocks.
    pub sample_rate: u32,
    /// Channel count of the underlying device (blocks are always mono).
    pub device_channels: u16,
}

/// An input device that can be opened for one recording at a time.
pub trait CaptureBackend: Send {
    /// Open and start the input stream, delivering mono blocks to `on_block`
    /// from the driver thread.
    ///
    /// # Errors
    ///
    /// Returns a device error when the microphone is missing, busy or refuses
    /// the stream configuration.
    fn open(&mut self, on_block: BlockCallback) -> CoreResult<StreamFormat>;

    /// Stop the stream and release the device handle. Must be idempotent.
    fn close(&mut self);
}

/// [`CaptureBackend`] over the platform's default CPAL host.
pub struct CpalBackend {
    device_name: Option<String>,
    stream: Option<Stream>,
}

impl CpalBackend {
    /// Backend for the named input device, or the default device when `None`.
    pub fn new(device_name: Option<String>) -> Self {
        Self {
            device_name,
            stream: None,
        }
    }

    #[track_caller]
    fn find_device(&self) -> CoreResult<Device> {
        let host = cpal::default_host();

        if let Some(wanted) = &self.device_name {
            let devices = host.input_devices().map_err(|e| CoreError::DeviceError {
                reason: format!("Failed to enumerate input devices: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

            #[allow(deprecated)]
            let found = devices.into_iter().find(|d| d.name().is_ok_and(|n| &n == wanted));

            match found {
                Some(device) => return Ok(device),
                None => warn!(device = %wanted, "Configured input device not found, using default"),
            }
        }

        host.default_input_device()
            .ok_or(CoreError::NoMicrophoneFound {
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

impl CaptureBackend for CpalBackend {
    #[track_caller]
    #[instrument(skip(self, on_block))]
    fn open(&mut self, mut on_block: BlockCallback) -> CoreResult<StreamFormat> {
        // A stream left over from a failed stop would hold the device.
        self.close();

        let device = self.find_device()?;

        let supported = device
            .default_input_config()
            .map_err(|e| CoreError::DeviceError {
                reason: format!("Failed to get config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let config: StreamConfig = supported.into();
        let channels = config.channels;
        let sample_rate = config.sample_rate;

        if channels == 0 || sample_rate == 0 {
            return Err(CoreError::UnsupportedFormat {
                reason: format!("{} channels at {} Hz", channels, sample_rate),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let stride = usize::from(channels);

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if stride == 1 {
                        on_block(data);
                    } else {
                        let mono: Vec<f32> = data
                            .chunks(stride)
                            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
                            .collect();
                        on_block(&mono);
                    }
                },
                |err| {
                    error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| CoreError::DeviceError {
                reason: format!("Failed to build stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        stream.play().map_err(|e| CoreError::DeviceError {
            reason: format!("Failed to start stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        self.stream = Some(stream);

        info!(sample_rate, channels, "Audio stream opened");

        Ok(StreamFormat {
            sample_rate,
            device_channels: channels,
        })
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            drop(stream);
            info!("Audio stream closed");
        }
    }
}
