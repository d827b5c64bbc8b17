use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::error::{FlowError, FlowResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Raw font bytes plus the face index inside a collection file.
#[derive(Clone)]
pub(crate) struct FontBytes {
    pub(crate) data: Arc<Vec<u8>>,
    pub(crate) index: u32,
}

impl std::fmt::Debug for FontBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBytes")
            .field("len", &self.data.len())
            .field("index", &self.index)
            .finish()
    }
}

/// Load a font file from disk.
pub(crate) fn load_font_file(path: &Path) -> FlowResult<FontBytes> {
    let data = std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
    Ok(FontBytes {
        data: Arc::new(data),
        index: 0,
    })
}

/// Pick a sans-serif face from the system font database.
///
/// Tries the generic sans-serif family, then a few common Linux/macOS families, then any face.
pub(crate) fn resolve_system_font() -> Option<FontBytes> {
    use usvg::fontdb::{Database, Family, Query, Weight};

    let mut db = Database::new();
    db.load_system_fonts();

    let named = ["DejaVu Sans", "Liberation Sans", "Noto Sans", "Helvetica", "Arial"];
    let mut candidates = vec![Family::SansSerif];
    candidates.extend(named.iter().map(|&n| Family::Name(n)));

    let id = candidates
        .iter()
        .find_map(|family| {
            db.query(&Query {
                families: std::slice::from_ref(family),
                weight: Weight::BOLD,
                ..Query::default()
            })
        })
        .or_else(|| db.faces().next().map(|face| face.id))?;

    db.with_face_data(id, |data, index| FontBytes {
        data: Arc::new(data.to_vec()),
        index,
    })
}

/// A shaped single-run text block ready to be drawn.
pub(crate) struct ShapedText {
    pub(crate) layout: parley::Layout<TextBrushRgba8>,
    pub(crate) width: f64,
    pub(crate) height: f64,
}

/// Parley contexts bound to one registered font face.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
    face: FaceStyle,
    font: vello_cpu::peniko::FontData,
}

/// Attributes that make parley pick the same face of a collection that is drawn.
#[derive(Clone, Copy, Debug)]
struct FaceStyle {
    weight: parley::style::FontWeight,
    style: parley::style::FontStyle,
    width: parley::style::FontWidth,
}

impl TextLayoutEngine {
    /// Register `font` and build layout contexts around the face at `font.index`.
    pub(crate) fn new(font: &FontBytes) -> FlowResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(font.data.as_ref().clone()),
            None,
        );
        let (family_id, info) = families
            .iter()
            .find_map(|(id, faces)| {
                faces
                    .iter()
                    .find(|info| info.index() == font.index)
                    .map(|info| (*id, info.clone()))
            })
            .ok_or_else(|| {
                FlowError::validation(format!("font bytes have no face at index {}", font.index))
            })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| FlowError::validation("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            face: FaceStyle {
                weight: info.weight(),
                style: info.style(),
                width: info.width(),
            },
            font: vello_cpu::peniko::FontData::new(
                vello_cpu::peniko::Blob::from(font.data.as_ref().clone()),
                font.index,
            ),
        })
    }

    pub(crate) fn font(&self) -> &vello_cpu::peniko::FontData {
        &self.font
    }

    /// Shape `text` on one line at `size_px`.
    pub(crate) fn shape(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> FlowResult<ShapedText> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(FlowError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontWeight(self.face.weight));
        builder.push_default(parley::style::StyleProperty::FontStyle(self.face.style));
        builder.push_default(parley::style::StyleProperty::FontWidth(self.face.width));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);

        Ok(ShapedText {
            width: f64::from(layout.width()),
            height: f64::from(layout.height()),
            layout,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
