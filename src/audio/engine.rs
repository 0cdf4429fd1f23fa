// Audio engine - CPAL output stream rendering metronome clicks
//
// # Format Support
//
// The device's preferred sample format is detected with `sample_format()` and
// the matching stream type is built (F32, I16 or U16). Clicks are rendered in
// f32 and converted per sample through CPAL's `FromSample<f32>`.
//
// # Lifetime
//
// The stream lives as long as the engine: dropping the `AudioEngine` closes the
// output. On macOS (CoreAudio) the stream is neither Send nor Sync, so the
// engine stays on the thread that created it.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use std::sync::{Arc, Mutex};

use crate::audio::click::ClickVoice;
use crate::audio::status::{AtomicOutputStatus, OutputFormat, OutputStatus};
use crate::messaging::channels::{CommandConsumer, NotificationProducer};
use crate::messaging::command::Command;
use crate::messaging::notification::{Notification, NotificationCategory};

pub struct AudioEngine {
    _stream: Stream,
    format: OutputFormat,
    pub status: AtomicOutputStatus,
}

impl AudioEngine {
    /// Open the default output device and start rendering clicks received
    /// on `command_rx`
    pub fn new(
        command_rx: CommandConsumer,
        notification_tx: Arc<Mutex<NotificationProducer>>,
    ) -> Result<Self, String> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or("No audio output device found")?;

        log::info!(
            "Audio device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let supported_config = device
            .default_output_config()
            .map_err(|e| format!("Audio configuration error: {}", e))?;

        let sample_format = supported_config.sample_format();
        log::debug!("Audio config: {:?}", supported_config);

        let format = OutputFormat {
            sample_rate: supported_config.sample_rate().0,
            channels: supported_config.channels(),
        };
        let channels = usize::from(format.channels);
        let config: StreamConfig = supported_config.into();

        let status = AtomicOutputStatus::new(OutputStatus::Opening);
        let voice = ClickVoice::new(format.sample_rate_hz());

        let stream = match sample_format {
            SampleFormat::F32 => Self::build_stream::<f32>(
                &device,
                &config,
                channels,
                command_rx,
                voice,
                status.clone(),
                notification_tx.clone(),
            ),
            SampleFormat::I16 => Self::build_stream::<i16>(
                &device,
                &config,
                channels,
                command_rx,
                voice,
                status.clone(),
                notification_tx.clone(),
            ),
            SampleFormat::U16 => Self::build_stream::<u16>(
                &device,
                &config,
                channels,
                command_rx,
                voice,
                status.clone(),
                notification_tx.clone(),
            ),
            _ => {
                return Err(format!(
                    "Unsupported sample format: {:?}. Supported formats: F32, I16, U16",
                    sample_format
                ));
            }
        }?;

        stream
            .play()
            .map_err(|e| format!("Failed to start audio stream: {}", e))?;

        status.set(OutputStatus::Running);

        log::info!("Audio engine started: {}", format);

        if let Ok(mut tx) = notification_tx.try_lock() {
            let notif = Notification::info(
                NotificationCategory::Audio,
                format!("Audio connected: {}", format),
            );
            let _ = ringbuf::traits::Producer::try_push(&mut *tx, notif);
        }

        Ok(Self {
            _stream: stream,
            format,
            status,
        })
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Build the output stream for sample type `T`
    ///
    /// The callback owns the command consumer and the click voice outright;
    /// nothing in it allocates, locks or blocks.
    fn build_stream<T>(
        device: &cpal::Device,
        config: &StreamConfig,
        channels: usize,
        mut command_rx: CommandConsumer,
        mut voice: ClickVoice,
        status: AtomicOutputStatus,
        notification_tx: Arc<Mutex<NotificationProducer>>,
    ) -> Result<Stream, String>
    where
        T: SizedSample + FromSample<f32> + Send + 'static,
    {
        let stream = device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    while let Some(cmd) = ringbuf::traits::Consumer::try_pop(&mut command_rx) {
                        match cmd {
                            Command::Click => voice.trigger(),
                            Command::Silence => voice.silence(),
                        }
                    }

                    for frame in data.chunks_mut(channels) {
                        let sample = voice.next_sample();
                        // Mono click on every channel
                        for channel_sample in frame.iter_mut() {
                            *channel_sample = Sample::from_sample::<f32>(sample);
                        }
                    }
                },
                move |err| {
                    // Runs outside the real-time callback, I/O is allowed here
                    log::error!("Audio stream error: {}", err);
                    status.set(OutputStatus::Failed);

                    if let Ok(mut tx) = notification_tx.try_lock() {
                        let notif = Notification::error(
                            NotificationCategory::Audio,
                            format!("Audio stream error: {}", err),
                        );
                        let _ = ringbuf::traits::Producer::try_push(&mut *tx, notif);
                    }
                },
                None,
            )
            .map_err(|e| format!("Error in stream creation: {}", e))?;

        Ok(stream)
    }
}
