use super::*;

const BRUSH: TextBrushRgba8 = TextBrushRgba8 {
    r: 255,
    g: 255,
    b: 255,
    a: 255,
};

fn system_face(pick: impl Fn(&usvg::fontdb::FaceInfo) -> bool) -> Option<FontBytes> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    let id = db.faces().find(|face| pick(face)).map(|face| face.id)?;
    db.with_face_data(id, |data, index| FontBytes {
        data: Arc::new(data.to_vec()),
        index,
    })
}

fn shaped_face_indices(engine: &mut TextLayoutEngine, text: &str) -> Vec<u32> {
    let shaped = engine.shape(text, 14.0, BRUSH).unwrap();
    let mut out = Vec::new();
    for line in shaped.layout.lines() {
        for item in line.items() {
            if let parley::layout::PositionedLayoutItem::GlyphRun(run) = item {
                out.push(run.run().font().index);
            }
        }
    }
    out
}

#[test]
fn missing_font_file_is_an_error() {
    assert!(load_font_file(Path::new("/definitely/not/a/font.ttf")).is_err());
}

#[test]
fn garbage_bytes_are_rejected() {
    let font = FontBytes {
        data: Arc::new(b"not a font".to_vec()),
        index: 0,
    };
    assert!(TextLayoutEngine::new(&font).is_err());
}

#[test]
fn shaping_rejects_bad_sizes() {
    let Some(font) = resolve_system_font() else {
        return;
    };
    let mut engine = TextLayoutEngine::new(&font).unwrap();
    assert!(engine.shape("A", 0.0, BRUSH).is_err());
    assert!(engine.shape("A", f32::NAN, BRUSH).is_err());
    let shaped = engine.shape("A", 14.0, BRUSH).unwrap();
    assert!(shaped.width > 0.0 && shaped.height > 0.0);
}

#[test]
fn collection_faces_shape_with_the_drawn_face() {
    let Some(font) = system_face(|face| face.index > 0) else {
        return;
    };
    let mut engine = TextLayoutEngine::new(&font).unwrap();
    assert_eq!(engine.font().index, font.index);

    let indices = shaped_face_indices(&mut engine, "A");
    assert!(!indices.is_empty());
    assert!(indices.iter().all(|&i| i == font.index), "{indices:?}");
}
