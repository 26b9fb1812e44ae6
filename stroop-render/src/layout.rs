//! Button geometry shared by drawing and pointer hit testing, so a click
//! on a color button is exactly equivalent to pressing its key.

use stroop_core::Color;

/// Axis-aligned region in frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Region {
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

pub const BUTTON_W: f32 = 120.0;
pub const BUTTON_H: f32 = 64.0;
pub const BUTTON_GAP: f32 = 16.0;
pub const BUTTON_MARGIN_BOTTOM: f32 = 48.0;

/// The four response buttons, centered in a row near the bottom edge, in
/// `Color::ALL` order.
pub fn response_buttons(width: u32, height: u32) -> [(Color, Region); 4] {
    let n = Color::ALL.len() as f32;
    let row_w = n * BUTTON_W + (n - 1.0) * BUTTON_GAP;
    let x0 = (width as f32 - row_w) / 2.0;
    let y = height as f32 - BUTTON_H - BUTTON_MARGIN_BOTTOM;

    let mut buttons = [(
        Color::Red,
        Region {
            x: 0.0,
            y,
            w: BUTTON_W,
            h: BUTTON_H,
        },
    ); 4];
    for (i, color) in Color::ALL.iter().enumerate() {
        buttons[i] = (
            *color,
            Region {
                x: x0 + i as f32 * (BUTTON_W + BUTTON_GAP),
                y,
                w: BUTTON_W,
                h: BUTTON_H,
            },
        );
    }
    buttons
}

/// Start/repeat button, used on the instructions and results screens.
pub fn action_button(width: u32, height: u32) -> Region {
    Region {
        x: width as f32 / 2.0 - 110.0,
        y: height as f32 * 0.78,
        w: 220.0,
        h: 56.0,
    }
}

/// What a click means, given where it landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    ResponseButton(Color),
    ActionButton,
}

pub fn hit_test(width: u32, height: u32, x: f32, y: f32) -> Option<HitTarget> {
    for (color, region) in response_buttons(width, height) {
        if region.contains(x, y) {
            return Some(HitTarget::ResponseButton(color));
        }
    }
    if action_button(width, height).contains(x, y) {
        return Some(HitTarget::ActionButton);
    }
    None
}
