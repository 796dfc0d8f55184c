//! Microphone capture using cpal
//!
//! The cpal stream is not `Send`, so it lives on a dedicated thread that
//! owns it for the lifetime of the capture. Clearing the `streaming` flag
//! ends that thread and drops the stream; `stop`, `cancel` and `Drop` all
//! clear it, so the device is released on every exit path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use rubato::{FftFixedIn, Resampler};
use tokio::sync::oneshot;

use super::flac::{pcm_to_flac, TARGET_SAMPLE_RATE};
use crate::application::ports::{CaptureError, CaptureHandle, MediaCapture};
use crate::domain::capture::{CaptureKind, CapturedMedia, MediaMimeType};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

struct OpenStream {
    handle: CaptureHandle,
    sample_rate: u32,
    thread: JoinHandle<()>,
}

pub struct MicrophoneCapture {
    /// Mono i16 samples at the device rate
    buffer: Arc<StdMutex<Vec<i16>>>,
    streaming: Arc<AtomicBool>,
    open: StdMutex<Option<OpenStream>>,
}

impl MicrophoneCapture {
    pub fn new() -> Self {
        Self {
            buffer: Arc::new(StdMutex::new(Vec::new())),
            streaming: Arc::new(AtomicBool::new(false)),
            open: StdMutex::new(None),
        }
    }

    fn input_device() -> Result<cpal::Device, CaptureError> {
        cpal::default_host()
            .default_input_device()
            .ok_or_else(|| CaptureError::PermissionDenied("no microphone available".into()))
    }

    /// Pick an i16/f32 config, preferring mono and 16kHz
    fn input_config(device: &cpal::Device) -> Result<(StreamConfig, SampleFormat), CaptureError> {
        let supported = device
            .supported_input_configs()
            .map_err(|e| CaptureError::PermissionDenied(format!("microphone refused: {}", e)))?;

        let mut best: Option<cpal::SupportedStreamConfigRange> = None;
        for config in supported {
            if !matches!(config.sample_format(), SampleFormat::I16 | SampleFormat::F32) {
                continue;
            }
            let includes_target = config.min_sample_rate().0 <= TARGET_SAMPLE_RATE
                && config.max_sample_rate().0 >= TARGET_SAMPLE_RATE;
            let better = match &best {
                None => true,
                Some(current) => {
                    config.channels() < current.channels()
                        || (includes_target && current.min_sample_rate().0 > TARGET_SAMPLE_RATE)
                }
            };
            if better {
                best = Some(config);
            }
        }

        let range = best.ok_or_else(|| CaptureError::Failed("no usable input format".into()))?;
        let sample_rate = if range.min_sample_rate().0 <= TARGET_SAMPLE_RATE
            && range.max_sample_rate().0 >= TARGET_SAMPLE_RATE
        {
            SampleRate(TARGET_SAMPLE_RATE)
        } else {
            range.min_sample_rate()
        };

        Ok((
            StreamConfig {
                channels: range.channels(),
                sample_rate,
                buffer_size: cpal::BufferSize::Default,
            },
            range.sample_format(),
        ))
    }

    fn downmix(samples: &[i16], channels: u16) -> Vec<i16> {
        if channels <= 1 {
            return samples.to_vec();
        }
        samples
            .chunks(channels as usize)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| i32::from(s)).sum();
                (sum / frame.len() as i32) as i16
            })
            .collect()
    }

    fn resample_to_target(samples: &[i16], source_rate: u32) -> Result<Vec<i16>, CaptureError> {
        if source_rate == TARGET_SAMPLE_RATE {
            return Ok(samples.to_vec());
        }

        let input: Vec<f32> = samples.iter().map(|&s| f32::from(s) / 32768.0).collect();
        let ratio = f64::from(TARGET_SAMPLE_RATE) / f64::from(source_rate);
        let output_len = (input.len() as f64 * ratio).ceil() as usize;

        let mut resampler = FftFixedIn::<f32>::new(
            source_rate as usize,
            TARGET_SAMPLE_RATE as usize,
            1024,
            2,
            1,
        )
        .map_err(|e| CaptureError::Failed(format!("resampler init failed: {}", e)))?;

        let mut output = Vec::with_capacity(output_len);
        let mut pos = 0;
        while pos < input.len() {
            let needed = resampler.input_frames_next();
            let end = (pos + needed).min(input.len());
            let mut chunk = input[pos..end].to_vec();
            chunk.resize(needed, 0.0);
            let waves = vec![chunk];

            let resampled = resampler
                .process(&waves, None)
                .map_err(|e| CaptureError::Failed(format!("resampling failed: {}", e)))?;
            output.extend(resampled[0].iter().map(|&s| (s * 32767.0) as i16));
            pos = end;
        }
        output.truncate(output_len);

        Ok(output)
    }

    /// Open the device and pump samples into `buffer` until `streaming`
    /// is cleared. Reports the device rate, or why it could not open.
    fn run_stream(
        buffer: Arc<StdMutex<Vec<i16>>>,
        streaming: Arc<AtomicBool>,
        ready: oneshot::Sender<Result<u32, CaptureError>>,
    ) {
        let opened = Self::input_device().and_then(|device| {
            let (config, format) = Self::input_config(&device)?;
            let channels = config.channels;
            let on_error = |err: cpal::StreamError| {
                tracing::warn!(error = %err, "microphone stream error")
            };

            let stream = match format {
                SampleFormat::I16 => {
                    let buffer = Arc::clone(&buffer);
                    device.build_input_stream(
                        &config,
                        move |data: &[i16], _: &cpal::InputCallbackInfo| {
                            let mono = Self::downmix(data, channels);
                            if let Ok(mut buf) = buffer.lock() {
                                buf.extend_from_slice(&mono);
                            }
                        },
                        on_error,
                        None,
                    )
                }
                _ => {
                    let buffer = Arc::clone(&buffer);
                    device.build_input_stream(
                        &config,
                        move |data: &[f32], _: &cpal::InputCallbackInfo| {
                            let pcm: Vec<i16> =
                                data.iter().map(|&s| (s * 32767.0) as i16).collect();
                            let mono = Self::downmix(&pcm, channels);
                            if let Ok(mut buf) = buffer.lock() {
                                buf.extend_from_slice(&mono);
                            }
                        },
                        on_error,
                        None,
                    )
                }
            }
            .map_err(|e| CaptureError::PermissionDenied(format!("microphone refused: {}", e)))?;

            stream
                .play()
                .map_err(|e| CaptureError::Failed(format!("microphone did not start: {}", e)))?;
            Ok((stream, config.sample_rate.0))
        });

        match opened {
            Ok((stream, sample_rate)) => {
                if ready.send(Ok(sample_rate)).is_err() {
                    return;
                }
                while streaming.load(Ordering::SeqCst) {
                    std::thread::sleep(POLL_INTERVAL);
                }
                drop(stream);
            }
            Err(err) => {
                streaming.store(false, Ordering::SeqCst);
                let _ = ready.send(Err(err));
            }
        }
    }

    /// Close the stream for `handle` and hand back its samples.
    async fn close(&self, handle: CaptureHandle) -> Result<(Vec<i16>, u32), CaptureError> {
        let open = {
            let mut slot = self.open.lock().unwrap_or_else(PoisonError::into_inner);
            match slot.take() {
                Some(open) if open.handle == handle => open,
                other => {
                    *slot = other;
                    return Err(CaptureError::UnknownHandle);
                }
            }
        };

        let OpenStream {
            thread,
            sample_rate,
            ..
        } = open;

        self.streaming.store(false, Ordering::SeqCst);
        tokio::task::spawn_blocking(move || thread.join())
            .await
            .map_err(|e| CaptureError::Failed(e.to_string()))?
            .map_err(|_| CaptureError::Failed("microphone thread panicked".into()))?;

        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        let samples = std::mem::take(&mut *buffer);
        drop(buffer);
        Ok((samples, sample_rate))
    }
}

impl Default for MicrophoneCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MicrophoneCapture {
    fn drop(&mut self) {
        self.streaming.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl MediaCapture for MicrophoneCapture {
    async fn start(&self, kind: CaptureKind) -> Result<CaptureHandle, CaptureError> {
        if kind != CaptureKind::Audio {
            return Err(CaptureError::PermissionDenied("the microphone records audio only".into()));
        }
        if self.is_active() || self.streaming.swap(true, Ordering::SeqCst) {
            return Err(CaptureError::DeviceBusy);
        }
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();

        let (ready_tx, ready_rx) = oneshot::channel();
        let buffer = Arc::clone(&self.buffer);
        let streaming = Arc::clone(&self.streaming);
        let thread = std::thread::spawn(move || Self::run_stream(buffer, streaming, ready_tx));

        let sample_rate = match ready_rx.await {
            Ok(Ok(rate)) => rate,
            Ok(Err(err)) => return Err(err),
            Err(_) => {
                self.streaming.store(false, Ordering::SeqCst);
                return Err(CaptureError::Failed("microphone thread exited".into()));
            }
        };

        let handle = CaptureHandle::new(kind);
        *self.open.lock().unwrap_or_else(PoisonError::into_inner) = Some(OpenStream {
            handle,
            sample_rate,
            thread,
        });
        tracing::debug!(sample_rate, "microphone opened");
        Ok(handle)
    }

    async fn stop(&self, handle: CaptureHandle) -> Result<CapturedMedia, CaptureError> {
        let (samples, sample_rate) = self.close(handle).await?;
        if samples.is_empty() {
            return Ok(CapturedMedia::new(Vec::new(), MediaMimeType::Flac));
        }

        let flac = tokio::task::spawn_blocking(move || {
            let pcm = Self::resample_to_target(&samples, sample_rate)?;
            pcm_to_flac(&pcm).map_err(|e| CaptureError::Failed(e.to_string()))
        })
        .await
        .map_err(|e| CaptureError::Failed(e.to_string()))??;

        Ok(CapturedMedia::new(flac, MediaMimeType::Flac))
    }

    async fn cancel(&self, handle: CaptureHandle) -> Result<(), CaptureError> {
        self.close(handle).await.map(|_| ())
    }

    fn is_active(&self) -> bool {
        self.open
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
