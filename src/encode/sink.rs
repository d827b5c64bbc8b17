use crate::foundation::error::{FlowError, FlowResult};
use crate::render::raster::FrameRGBA;

/// Configuration provided to a [`FrameSink`] when it is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Number of loops; `0` loops forever.
    pub loop_count: u16,
    /// Display time of every frame in milliseconds.
    pub frame_delay_ms: u32,
}

impl SinkConfig {
    /// Reject configurations no sink can honor.
    pub fn validate(&self) -> FlowResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(FlowError::validation("sink width/height must be non-zero"));
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(FlowError::validation(format!(
                "sink size {}x{} exceeds {max}x{max}",
                self.width,
                self.height,
                max = u16::MAX
            )));
        }
        if self.frame_delay_ms == 0 {
            return Err(FlowError::validation("frame delay must be non-zero"));
        }
        Ok(())
    }

    /// Return an error unless `frame` has exactly the configured size.
    pub fn check_frame(&self, frame: &FrameRGBA) -> FlowResult<()> {
        if frame.width != self.width || frame.height != self.height {
            return Err(FlowError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }
        if frame.data.len() != self.width as usize * self.height as usize * 4 {
            return Err(FlowError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }
        Ok(())
    }
}

/// Sink contract for consuming rendered frames in playback order.
///
/// Lifecycle: `start` once, `add_frame` any number of times, `finish` once. Output order equals
/// `add_frame` call order.
pub trait FrameSink: Send {
    /// Called once before any frames are added.
    fn start(&mut self, cfg: SinkConfig) -> FlowResult<()>;
    /// Append one frame.
    fn add_frame(&mut self, frame: &FrameRGBA) -> FlowResult<()>;
    /// Called once after the last frame.
    fn finish(&mut self) -> FlowResult<()>;
}

/// In-memory sink for tests and PNG dumps.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    finished: bool,
    frames: Vec<FrameRGBA>,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `start`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Borrow the captured frames in call order.
    pub fn frames(&self) -> &[FrameRGBA] {
        &self.frames
    }

    /// Return `true` once `finish` succeeded.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn start(&mut self, cfg: SinkConfig) -> FlowResult<()> {
        if self.cfg.is_some() {
            return Err(FlowError::invalid_state("sink already started"));
        }
        cfg.validate()?;
        self.cfg = Some(cfg);
        self.frames.clear();
        Ok(())
    }

    fn add_frame(&mut self, frame: &FrameRGBA) -> FlowResult<()> {
        match self.cfg {
            Some(cfg) if !self.finished => {
                cfg.check_frame(frame)?;
                self.frames.push(frame.clone());
                Ok(())
            }
            _ => Err(FlowError::invalid_state(
                "add_frame requires a started, unfinished sink",
            )),
        }
    }

    fn finish(&mut self) -> FlowResult<()> {
        if self.cfg.is_none() || self.finished {
            return Err(FlowError::invalid_state(
                "finish requires a started, unfinished sink",
            ));
        }
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
