use demo_kit::{
    math::Vector4,
    render::{FontError, FontLayout},
};

#[test]
fn should_reject_atlas_of_wrong_width() {
    let err = FontLayout::new("abc", 8, 30, 16).unwrap_err();
    assert!(matches!(
        err,
        FontError::AtlasWidth {
            expected: 24,
            actual: 30
        }
    ));
}

#[test]
fn should_scale_glyphs_to_height() {
    let layout = FontLayout::new("abc ", 8, 32, 16).unwrap();
    assert_eq!(layout.tex_char_width(), 0.25);
    assert_eq!(layout.char_width(16.0), 8.0);
    assert_eq!(layout.char_width(32.0), 16.0);
}

#[test]
fn should_emit_two_triangles_per_glyph() {
    let layout = FontLayout::new("abc ", 8, 32, 16).unwrap();
    let colour = Vector4::new(1.0, 0.5, 0.0, 1.0);
    let mut vertices = Vec::new();

    // uppercase is folded, spaces and unknown glyphs only advance
    let drawn = layout.layout("Ab z", 10.0, 20.0, 32.0, colour, &mut vertices);
    assert_eq!(drawn, 2);
    assert_eq!(vertices.len(), 12);

    assert_eq!(vertices[0].position, [10.0, 52.0]);
    assert_eq!(vertices[0].tex_coords, [0.0, 0.0]);
    assert_eq!(vertices[1].position, [26.0, 20.0]);
    assert_eq!(vertices[1].tex_coords, [0.25, 1.0]);
    assert_eq!(vertices[0].color, [1.0, 0.5, 0.0, 1.0]);

    assert_eq!(vertices[6].position, [26.0, 52.0]);
    assert_eq!(vertices[6].tex_coords, [0.25, 0.0]);
    assert_eq!(vertices[11].position, [42.0, 52.0]);
    assert_eq!(vertices[11].tex_coords, [0.5, 0.0]);
}

#[test]
fn should_append_to_existing_vertices() {
    let layout = FontLayout::new("ab", 4, 8, 8).unwrap();
    let mut vertices = Vec::new();
    layout.layout("a", 0.0, 0.0, 8.0, Vector4::splat(1.0), &mut vertices);
    layout.layout("b", 0.0, 10.0, 8.0, Vector4::splat(1.0), &mut vertices);
    assert_eq!(vertices.len(), 12);
    assert_eq!(vertices[6].position, [0.0, 18.0]);
}
