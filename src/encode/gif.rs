use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use image::codecs::gif::{GifEncoder, Repeat};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::error::{FlowError, FlowResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::raster::FrameRGBA;

/// Palette quantization speed handed to the GIF encoder (1 = best, 30 = fastest).
const QUANTIZE_SPEED: i32 = 10;

/// Lifecycle phase of an [`AnimationEncoder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncoderPhase {
    /// Waiting for `start`.
    Idle,
    /// Accepting frames.
    Started,
    /// Trailer written and stream flushed.
    Finished,
    /// A write failed; every further call is rejected.
    Errored,
}

struct StreamState<W> {
    inner: Option<W>,
    error: Option<String>,
}

/// Writer handed to the GIF encoder.
///
/// The encoder writes its trailer on drop and swallows the result, so write failures are
/// recorded here and inspected after the encoder is gone.
struct SharedWriter<W> {
    state: Arc<Mutex<StreamState<W>>>,
}

impl<W: Write> Write for SharedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(inner) = state.inner.as_mut() else {
            return Err(std::io::Error::other("output stream already closed"));
        };
        match inner.write(buf) {
            Ok(n) => Ok(n),
            Err(e) => {
                state.error.get_or_insert_with(|| e.to_string());
                Err(e)
            }
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(inner) = state.inner.as_mut() else {
            return Ok(());
        };
        match inner.flush() {
            Ok(()) => Ok(()),
            Err(e) => {
                state.error.get_or_insert_with(|| e.to_string());
                Err(e)
            }
        }
    }
}

enum EncoderState<W: Write + Send> {
    Idle {
        out: W,
    },
    Started {
        encoder: Box<GifEncoder<SharedWriter<W>>>,
        stream: Arc<Mutex<StreamState<W>>>,
        cfg: SinkConfig,
    },
    Finished {
        out: W,
    },
    Errored,
}

/// Stateful GIF accumulator.
///
/// Frames are written progressively in `add_frame` call order; nothing is buffered beyond one
/// frame. Any write failure moves the encoder to [`EncoderPhase::Errored`], which rejects every
/// further call.
pub struct AnimationEncoder<W: Write + Send> {
    state: EncoderState<W>,
    frames_written: usize,
    matte: [u8; 4],
}

impl<W: Write + Send> std::fmt::Debug for AnimationEncoder<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationEncoder")
            .field("phase", &self.state())
            .field("frames_written", &self.frames_written)
            .finish_non_exhaustive()
    }
}

impl<W: Write + Send> AnimationEncoder<W> {
    /// Idle encoder writing into `out`. Translucent pixels are flattened over black.
    pub fn new(out: W) -> Self {
        Self {
            state: EncoderState::Idle { out },
            frames_written: 0,
            matte: [0, 0, 0, 255],
        }
    }

    /// Replace the matte color translucent pixels are flattened over.
    pub fn with_matte(mut self, matte: [u8; 4]) -> Self {
        self.matte = matte;
        self
    }

    /// Current lifecycle phase.
    pub fn state(&self) -> EncoderPhase {
        match self.state {
            EncoderState::Idle { .. } => EncoderPhase::Idle,
            EncoderState::Started { .. } => EncoderPhase::Started,
            EncoderState::Finished { .. } => EncoderPhase::Finished,
            EncoderState::Errored => EncoderPhase::Errored,
        }
    }

    /// Number of frames appended so far.
    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    /// Idle → Started. Configures looping and the per-frame delay.
    pub fn start(&mut self, cfg: SinkConfig) -> FlowResult<()> {
        if !matches!(self.state, EncoderState::Idle { .. }) {
            return Err(self.out_of_sequence("start"));
        }
        cfg.validate()?;

        let out = match std::mem::replace(&mut self.state, EncoderState::Errored) {
            EncoderState::Idle { out } => out,
            other => {
                self.state = other;
                return Err(self.out_of_sequence("start"));
            }
        };

        let stream = Arc::new(Mutex::new(StreamState {
            inner: Some(out),
            error: None,
        }));
        let mut encoder = GifEncoder::new_with_speed(
            SharedWriter {
                state: Arc::clone(&stream),
            },
            QUANTIZE_SPEED,
        );
        let repeat = match cfg.loop_count {
            0 => Repeat::Infinite,
            n => Repeat::Finite(n),
        };
        encoder
            .set_repeat(repeat)
            .map_err(|e| FlowError::io(format!("configure gif looping: {e}")))?;

        tracing::debug!(
            width = cfg.width,
            height = cfg.height,
            loop_count = cfg.loop_count,
            delay_ms = cfg.frame_delay_ms,
            "gif encoder started"
        );
        self.state = EncoderState::Started {
            encoder: Box::new(encoder),
            stream,
            cfg,
        };
        self.frames_written = 0;
        Ok(())
    }

    /// Append one frame. Only valid while Started.
    pub fn add_frame(&mut self, frame: &FrameRGBA) -> FlowResult<()> {
        let EncoderState::Started { encoder, cfg, .. } = &mut self.state else {
            return Err(self.out_of_sequence("add_frame"));
        };
        cfg.check_frame(frame)?;

        let mut opaque = vec![0u8; frame.data.len()];
        flatten_to_opaque_rgba8(&mut opaque, &frame.data, frame.premultiplied, self.matte)?;
        let Some(buffer) = image::RgbaImage::from_raw(cfg.width, cfg.height, opaque) else {
            return Err(FlowError::validation(
                "frame buffer does not match configured size",
            ));
        };
        let delay = image::Delay::from_numer_denom_ms(cfg.frame_delay_ms, 1);

        if let Err(e) = encoder.encode_frame(image::Frame::from_parts(buffer, 0, 0, delay)) {
            self.state = EncoderState::Errored;
            return Err(FlowError::io(format!(
                "write gif frame {}: {e}",
                self.frames_written
            )));
        }
        self.frames_written += 1;
        Ok(())
    }

    /// Started → Finished. Writes the trailer and flushes the output stream.
    pub fn finish(&mut self) -> FlowResult<()> {
        match &self.state {
            EncoderState::Started { .. } if self.frames_written == 0 => {
                return Err(FlowError::invalid_state(
                    "finish called before any frame was added",
                ));
            }
            EncoderState::Started { .. } => {}
            _ => return Err(self.out_of_sequence("finish")),
        }

        let (encoder, stream) = match std::mem::replace(&mut self.state, EncoderState::Errored) {
            EncoderState::Started {
                encoder, stream, ..
            } => (encoder, stream),
            other => {
                self.state = other;
                return Err(self.out_of_sequence("finish"));
            }
        };
        drop(encoder);

        let mut guard = stream.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(e) = guard.error.take() {
            return Err(FlowError::io(format!("write gif stream: {e}")));
        }
        let Some(mut out) = guard.inner.take() else {
            return Err(FlowError::io("gif output stream went missing"));
        };
        drop(guard);
        out.flush()
            .map_err(|e| FlowError::io(format!("flush gif stream: {e}")))?;

        tracing::debug!(frames = self.frames_written, "gif encoder finished");
        self.state = EncoderState::Finished { out };
        Ok(())
    }

    /// Give back the output stream. Only valid once Finished.
    pub fn into_inner(self) -> FlowResult<W> {
        match self.state {
            EncoderState::Finished { out } => Ok(out),
            _ => Err(FlowError::invalid_state(
                "output stream is only available after finish",
            )),
        }
    }

    fn out_of_sequence(&self, op: &str) -> FlowError {
        FlowError::invalid_state(format!(
            "{op} is not allowed while the encoder is {:?}",
            self.state()
        ))
    }
}

impl<W: Write + Send> FrameSink for AnimationEncoder<W> {
    fn start(&mut self, cfg: SinkConfig) -> FlowResult<()> {
        AnimationEncoder::start(self, cfg)
    }

    fn add_frame(&mut self, frame: &FrameRGBA) -> FlowResult<()> {
        AnimationEncoder::add_frame(self, frame)
    }

    fn finish(&mut self) -> FlowResult<()> {
        AnimationEncoder::finish(self)
    }
}

/// Composite RGBA8 pixels over an opaque `matte`, writing fully opaque pixels into `dst`.
pub(crate) fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    matte: [u8; 4],
) -> FlowResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(FlowError::validation(
            "flatten_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg = [
        u16::from(matte[0]),
        u16::from(matte[1]),
        u16::from(matte[2]),
    ];

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            let fg = if src_is_premul {
                u16::from(s[c])
            } else {
                mul_div255_u16(u16::from(s[c]), a)
            };
            d[c] = (fg + mul_div255_u16(bg[c], inv)).min(255) as u8;
        }
        d[3] = 255;
    }

    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
