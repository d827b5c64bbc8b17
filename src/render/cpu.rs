use std::path::PathBuf;

use kurbo::Point;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{FlowError, FlowResult};
use crate::render::geometry::{
    arrow_head, arrow_shaft, bezpath_to_cpu, edge_endpoints, node_path, outline,
};
use crate::render::raster::FrameRGBA;
use crate::render::style::{CAPTION_BOTTOM_MARGIN, CAPTION_SIZE_PX, LABEL_SIZE_PX, Palette};
use crate::render::text::{
    TextBrushRgba8, TextLayoutEngine, load_font_file, resolve_system_font,
};
use crate::spec::model::{DiagramSpec, Frame};

/// Options for [`FrameRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOpts {
    /// Output size.
    pub canvas: Canvas,
    /// Font file for labels and captions. When unset, a system sans-serif face is used.
    pub font_path: Option<PathBuf>,
    /// Look up system fonts when `font_path` is unset.
    pub system_fonts: bool,
    /// Colors.
    pub palette: Palette,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            font_path: None,
            system_fonts: true,
            palette: Palette::default(),
        }
    }
}

impl RenderOpts {
    /// Options that never touch fonts; labels and captions are skipped.
    pub fn without_text(canvas: Canvas) -> Self {
        Self {
            canvas,
            system_fonts: false,
            ..Self::default()
        }
    }
}

enum FontState {
    Unresolved,
    Missing,
    Ready(Box<TextLayoutEngine>),
}

/// CPU frame renderer powered by `vello_cpu`.
///
/// Output depends only on the spec and the frame being drawn. The renderer keeps a raster
/// context and the resolved font between calls.
pub struct FrameRenderer {
    opts: RenderOpts,
    ctx: Option<vello_cpu::RenderContext>,
    text: FontState,
}

impl std::fmt::Debug for FrameRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameRenderer")
            .field("opts", &self.opts)
            .field("text_ready", &matches!(self.text, FontState::Ready(_)))
            .finish_non_exhaustive()
    }
}

impl FrameRenderer {
    /// Create a renderer. Fails only for canvases the rasterizer cannot hold.
    pub fn new(opts: RenderOpts) -> FlowResult<Self> {
        Canvas::new(opts.canvas.width, opts.canvas.height)?;
        Ok(Self {
            opts,
            ctx: None,
            text: FontState::Unresolved,
        })
    }

    /// Output canvas.
    pub fn canvas(&self) -> Canvas {
        self.opts.canvas
    }

    /// Return `true` when a font is available for labels and captions.
    pub fn has_text(&mut self) -> bool {
        self.ensure_text();
        matches!(self.text, FontState::Ready(_))
    }

    fn ensure_text(&mut self) {
        if !matches!(self.text, FontState::Unresolved) {
            return;
        }
        let font = match &self.opts.font_path {
            Some(path) => match load_font_file(path) {
                Ok(f) => Some(f),
                Err(e) => {
                    tracing::warn!(error = %e, "configured font could not be loaded");
                    None
                }
            },
            None if self.opts.system_fonts => resolve_system_font(),
            None => None,
        };
        self.text = match font.map(|f| TextLayoutEngine::new(&f)) {
            Some(Ok(engine)) => FontState::Ready(Box::new(engine)),
            Some(Err(e)) => {
                tracing::warn!(error = %e, "font rejected; labels and captions are skipped");
                FontState::Missing
            }
            None => {
                if self.opts.font_path.is_some() || self.opts.system_fonts {
                    tracing::warn!("no usable font found; labels and captions are skipped");
                }
                FontState::Missing
            }
        };
    }

    /// Render one fully composed frame.
    ///
    /// Draw order: background, every resolvable flow, every node, then the caption.
    pub fn render_frame(&mut self, spec: &DiagramSpec, frame: &Frame) -> FlowResult<FrameRGBA> {
        self.ensure_text();
        let canvas = self.opts.canvas;
        let width = u16::try_from(canvas.width)
            .map_err(|_| FlowError::validation("canvas width exceeds u16"))?;
        let height = u16::try_from(canvas.height)
            .map_err(|_| FlowError::validation("canvas height exceeds u16"))?;

        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();

        let out = self.draw(&mut ctx, spec, frame);
        let result = out.map(|()| {
            let mut pixmap = vello_cpu::Pixmap::new(width, height);
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
            FrameRGBA {
                width: canvas.width,
                height: canvas.height,
                data: pixmap.data_as_u8_slice().to_vec(),
                premultiplied: true,
            }
        });
        self.ctx = Some(ctx);
        result
    }

    fn draw(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        spec: &DiagramSpec,
        frame: &Frame,
    ) -> FlowResult<()> {
        let palette = self.opts.palette;
        let canvas = self.opts.canvas;
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);

        set_color(ctx, palette.background);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(canvas.width),
            f64::from(canvas.height),
        ));

        for flow in &spec.flows {
            let (Some(from), Some(to)) = (spec.node(&flow.from), spec.node(&flow.to)) else {
                tracing::debug!(from = %flow.from, to = %flow.to, "skipping dangling flow");
                continue;
            };
            let Some((start, tip)) =
                edge_endpoints(Point::new(from.x, from.y), Point::new(to.x, to.y))
            else {
                continue;
            };
            let style = palette.edge(frame.highlights_flow(&flow.from, &flow.to));
            set_color(ctx, style.color);
            ctx.fill_path(&bezpath_to_cpu(&arrow_shaft(start, tip, style.width)));
            ctx.fill_path(&bezpath_to_cpu(&arrow_head(start, tip)));
        }

        for node in &spec.nodes {
            let center = Point::new(node.x, node.y);
            let style = palette.node(node.kind, frame.highlights_node(&node.id));
            let shape = node_path(center);

            set_color(ctx, style.fill);
            ctx.fill_path(&bezpath_to_cpu(&shape));
            set_color(ctx, style.border);
            ctx.fill_path(&bezpath_to_cpu(&outline(&shape, style.border_width)));

            if !node.label.is_empty() {
                self.draw_text(
                    ctx,
                    &node.label,
                    LABEL_SIZE_PX,
                    palette.text,
                    TextAnchor::Center(center),
                )?;
            }
        }

        if let Some(caption) = frame.visible_caption() {
            self.draw_text(
                ctx,
                caption,
                CAPTION_SIZE_PX,
                palette.caption,
                TextAnchor::BottomCenter(caption_anchor(canvas)),
            )?;
        }

        Ok(())
    }

    fn draw_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        size_px: f32,
        color: Rgba8,
        anchor: TextAnchor,
    ) -> FlowResult<()> {
        let FontState::Ready(engine) = &mut self.text else {
            return Ok(());
        };
        let brush = TextBrushRgba8 {
            r: color.r,
            g: color.g,
            b: color.b,
            a: color.a,
        };
        let shaped = engine.shape(text, size_px, brush)?;
        let origin = match anchor {
            TextAnchor::Center(p) => {
                Point::new(p.x - shaped.width / 2.0, p.y - shaped.height / 2.0)
            }
            TextAnchor::BottomCenter(p) => {
                Point::new(p.x - shaped.width / 2.0, p.y - shaped.height)
            }
        };

        ctx.set_transform(vello_cpu::kurbo::Affine::translate((origin.x, origin.y)));
        for line in shaped.layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(engine.font())
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
enum TextAnchor {
    Center(Point),
    BottomCenter(Point),
}

/// Bottom-center point of the caption box.
pub fn caption_anchor(canvas: Canvas) -> Point {
    Point::new(
        f64::from(canvas.width) / 2.0,
        f64::from(canvas.height) - CAPTION_BOTTOM_MARGIN,
    )
}

fn set_color(ctx: &mut vello_cpu::RenderContext, c: Rgba8) {
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
}

/// Render every playback frame of `spec` in order and push it into `sink`.
///
/// Returns the number of frames pushed. The sink is finished on success.
#[tracing::instrument(skip(renderer, spec, sink), fields(title = %spec.title))]
pub fn render_sequence(
    renderer: &mut FrameRenderer,
    spec: &DiagramSpec,
    sink: &mut dyn FrameSink,
    cfg: SinkConfig,
) -> FlowResult<usize> {
    let frames = spec.playback_frames();
    sink.start(cfg)?;
    for frame in &frames {
        tracing::debug!(index = frame.index, "rendering frame");
        let raster = renderer.render_frame(spec, frame)?;
        sink.add_frame(&raster)?;
    }
    sink.finish()?;
    Ok(frames.len())
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
