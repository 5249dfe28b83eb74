//! Fixed slide geometry on the 1600×2000 canvas.

pub const CANVAS_WIDTH: u32 = 1600;
pub const CANVAS_HEIGHT: u32 = 2000;

/// Left and right margin.
pub const PADDING: f32 = 144.0;
/// Distance from the top and bottom edges to the header and footer baselines.
pub const HEADER_FOOTER_PADDING: f32 = 192.0;
/// Baseline of the first content line.
pub const CONTENT_START_Y: f32 = 420.0;

/// Gap between a title block and the body that follows it.
pub const H2_TO_P: f32 = 80.0;
/// Gap between body blocks.
pub const P_TO_P: f32 = 64.0;

pub const BULLET_MARKER: &str = "→";
/// Space between the marker and the item text.
pub const BULLET_GAP: f32 = 32.0;

pub const AVATAR_SIZE: f32 = 100.0;
pub const AVATAR_GAP: f32 = 16.0;
/// Lift of the avatar center above the header baseline.
pub const AVATAR_BASELINE_LIFT: f32 = 9.0;

pub const HEADER_FOOTER_OPACITY: f32 = 0.7;
pub const SUBTITLE_OPACITY: f32 = 0.9;

/// Side of a decoration shape's box. Shapes are centred on opposite canvas corners.
pub const DECORATION_SIZE: f32 = 720.0;

/// Footer arrow shown on every slide but the last.
pub const NEXT_ARROW: &str = "→";

pub fn content_width() -> f32 {
    CANVAS_WIDTH as f32 - 2.0 * PADDING
}

/// Height available below `CONTENT_START_Y` and above the footer.
pub fn content_height() -> f32 {
    CANVAS_HEIGHT as f32 - CONTENT_START_Y - HEADER_FOOTER_PADDING
}

pub fn footer_baseline() -> f32 {
    CANVAS_HEIGHT as f32 - HEADER_FOOTER_PADDING
}
