use ab_glyph::{Font, FontArc, Glyph, PxScale, ScaleFont, point};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::Arc;
use stroop_core::{Rgba, SessionPhase, SessionView, TrialView};
use tiny_skia::{Color, Paint, Pixmap, PixmapPaint, PremultipliedColorU8, Rect, Transform};

use crate::layout;

const WHITE: Rgba = [255, 255, 255, 255];
const DIM: Rgba = [170, 170, 170, 255];
const BAR_BG: Rgba = [60, 60, 60, 255];
const BUTTON_TEXT: Rgba = [20, 20, 20, 255];

/// Candidate paths tried when `STROOP_FONT` is unset.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Loads the UI font from `STROOP_FONT` or a list of common system paths.
pub fn load_system_font() -> Result<FontArc> {
    if let Ok(path) = std::env::var("STROOP_FONT") {
        let bytes =
            std::fs::read(&path).with_context(|| format!("reading font at {path}"))?;
        return FontArc::try_from_vec(bytes).with_context(|| format!("parsing font at {path}"));
    }
    for path in FONT_CANDIDATES {
        if let Ok(bytes) = std::fs::read(path) {
            if let Ok(font) = FontArc::try_from_vec(bytes) {
                return Ok(font);
            }
        }
    }
    anyhow::bail!("no usable font found; set STROOP_FONT to a .ttf path")
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TextKey {
    text: String,
    size_px: u32,
    color: Rgba,
}

/// Software renderer for the session view.
///
/// Draws a full frame per call into an offscreen pixmap and copies it to
/// the caller's RGBA buffer. Rasterized text lines are cached by
/// (text, size, color) since the label set is small and repetitive.
pub struct FrameRenderer {
    width: u32,
    height: u32,
    center: (f32, f32),
    font: FontArc,
    canvas: Pixmap,
    text_cache: HashMap<TextKey, Arc<Pixmap>>,
}

impl FrameRenderer {
    pub fn new(width: u32, height: u32) -> Result<FrameRenderer> {
        Self::with_font(width, height, load_system_font()?)
    }

    pub fn with_font(width: u32, height: u32, font: FontArc) -> Result<FrameRenderer> {
        let canvas = Pixmap::new(width, height).context("creating render canvas")?;
        Ok(FrameRenderer {
            width,
            height,
            center: (width as f32 / 2.0, height as f32 / 2.0),
            font,
            canvas,
            text_cache: HashMap::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.width = width;
        self.height = height;
        self.center = (width as f32 / 2.0, height as f32 / 2.0);
        self.canvas = Pixmap::new(width, height).context("resizing render canvas")?;
        Ok(())
    }

    /// Renders the view into `frame` (RGBA, width * height * 4 bytes).
    pub fn render_frame(&mut self, view: &SessionView, frame: &mut [u8]) -> Result<()> {
        self.canvas.fill(Color::BLACK);

        match view.phase {
            SessionPhase::Instructions => self.draw_instructions(),
            SessionPhase::Block1 | SessionPhase::Block2 => {
                let trial = view.trial.as_ref().context("block phase without trial view")?;
                self.draw_trial(trial);
            }
            SessionPhase::Pause => self.draw_pause(view.pause_remaining_s),
            SessionPhase::Results => {
                let results = view.results.as_ref().context("results phase without stats")?;
                self.draw_results(results);
            }
        }

        let data = self.canvas.data();
        anyhow::ensure!(
            frame.len() == data.len(),
            "frame buffer is {} bytes, canvas is {}",
            frame.len(),
            data.len()
        );
        frame.copy_from_slice(data);
        Ok(())
    }

    fn draw_instructions(&mut self) {
        let (cx, cy) = self.center;
        self.draw_text("STROOP TASK", cx, cy - 220.0, 44.0, WHITE);
        self.draw_text(
            "Press the key matching the INK COLOR of the word,",
            cx,
            cy - 140.0,
            22.0,
            WHITE,
        );
        self.draw_text("not the word itself.", cx, cy - 108.0, 22.0, WHITE);
        self.draw_text(
            "Respond as quickly and accurately as you can.",
            cx,
            cy - 60.0,
            22.0,
            DIM,
        );

        self.draw_response_buttons(true);
        self.draw_action_button("START  (SPACE)");
    }

    fn draw_trial(&mut self, trial: &TrialView) {
        self.draw_progress(trial);

        let (cx, cy) = self.center;
        if trial.fixation {
            self.draw_fixation_cross(cx, cy);
        } else if let Some(stimulus) = &trial.stimulus {
            if let Some(word) = stimulus.word {
                let ink = stimulus.ink;
                self.draw_text(word.label(), cx, cy, 96.0, ink);
            }
        }
        // Blank phase and the inter-trial gap draw nothing in the center.

        self.draw_response_buttons(false);
    }

    fn draw_progress(&mut self, trial: &TrialView) {
        let bar_w = self.width as f32 * 0.6;
        let bar_h = 8.0;
        let x = (self.width as f32 - bar_w) / 2.0;
        let y = 40.0;

        self.fill_rect(x, y, bar_w, bar_h, BAR_BG);
        let filled = bar_w * trial.progress();
        if filled > 0.0 {
            self.fill_rect(x, y, filled, bar_h, WHITE);
        }

        let label = format!(
            "Block {}   trial {}/{}",
            trial.block,
            (trial.index + 1).min(trial.total),
            trial.total
        );
        self.draw_text(&label, self.center.0, y + 36.0, 18.0, DIM);
    }

    fn draw_fixation_cross(&mut self, cx: f32, cy: f32) {
        let arm = 24.0;
        let thickness = 4.0;
        self.fill_rect(cx - arm, cy - thickness / 2.0, arm * 2.0, thickness, WHITE);
        self.fill_rect(cx - thickness / 2.0, cy - arm, thickness, arm * 2.0, WHITE);
    }

    fn draw_pause(&mut self, remaining_s: u32) {
        let (cx, cy) = self.center;
        self.draw_text("Break", cx, cy - 60.0, 40.0, WHITE);
        let line = format!("Block 2 starts in {remaining_s} s");
        self.draw_text(&line, cx, cy + 10.0, 24.0, DIM);
    }

    fn draw_results(&mut self, results: &stroop_core::ResultsView) {
        let (cx, cy) = self.center;
        self.draw_text("RESULTS", cx, cy - 220.0, 40.0, WHITE);

        let rows = [
            ("Block 1", results.block1),
            ("Block 2", results.block2),
            ("Overall", results.overall),
        ];
        for (i, (label, stats)) in rows.iter().enumerate() {
            let y = cy - 130.0 + i as f32 * 60.0;
            self.draw_text(label, cx, y, 24.0, WHITE);
            let line = format!(
                "congruent {}/{} at {:.0} ms,  incongruent {}/{} at {:.0} ms",
                stats.congruent_correct,
                stats.congruent_total,
                stats.congruent_avg_ms,
                stats.incongruent_correct,
                stats.incongruent_total,
                stats.incongruent_avg_ms,
            );
            self.draw_text(&line, cx, y + 28.0, 20.0, DIM);
        }

        let effect = format!("Stroop effect: {:+.0} ms", results.stroop_effect_ms);
        self.draw_text(&effect, cx, cy + 90.0, 28.0, WHITE);

        self.draw_action_button("REPEAT  (SPACE)");
    }

    fn draw_response_buttons(&mut self, with_labels: bool) {
        for (color, region) in layout::response_buttons(self.width, self.height) {
            self.fill_rect(region.x, region.y, region.w, region.h, color.rgba());
            let (bx, by) = region.center();
            let key = color.key().to_ascii_uppercase().to_string();
            self.draw_text(&key, bx, by, 28.0, BUTTON_TEXT);
            if with_labels {
                self.draw_text(color.label(), bx, region.y - 18.0, 16.0, DIM);
            }
        }
    }

    fn draw_action_button(&mut self, label: &str) {
        let region = layout::action_button(self.width, self.height);
        self.fill_rect(region.x, region.y, region.w, region.h, [40, 40, 40, 255]);
        let (bx, by) = region.center();
        self.draw_text(label, bx, by, 22.0, WHITE);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        let Some(rect) = Rect::from_xywh(x, y, w, h) else {
            return;
        };
        let mut paint = Paint::default();
        paint.anti_alias = false;
        paint.set_color(Color::from_rgba8(color[0], color[1], color[2], color[3]));
        self.canvas.fill_rect(rect, &paint, Transform::identity(), None);
    }

    /// Draws `text` centered on (cx, cy), going through the pixmap cache.
    fn draw_text(&mut self, text: &str, cx: f32, cy: f32, size_px: f32, color: Rgba) {
        let key = TextKey {
            text: text.to_string(),
            size_px: size_px as u32,
            color,
        };
        let pixmap = match self.text_cache.get(&key) {
            Some(p) => Arc::clone(p),
            None => {
                let p = Arc::new(rasterize_text(text, size_px, &self.font, color));
                self.text_cache.insert(key, Arc::clone(&p));
                p
            }
        };

        let x = (cx - pixmap.width() as f32 / 2.0).floor() as i32;
        let y = (cy - pixmap.height() as f32 / 2.0).floor() as i32;
        self.canvas.draw_pixmap(
            x,
            y,
            pixmap.as_ref().as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }
}

/// Rasterizes one line of text into a transparent premultiplied pixmap.
pub fn rasterize_text(text: &str, font_size: f32, font: &FontArc, color: Rgba) -> Pixmap {
    let scale = PxScale::from(font_size);
    let sf = font.as_scaled(scale);

    // Lay out glyphs with the baseline at the ascent.
    let mut pen_x = 0.0f32;
    let mut glyphs = Vec::<Glyph>::new();
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = glyphs.last() {
            pen_x += sf.kern(prev.id, id);
        }
        glyphs.push(Glyph {
            id,
            scale,
            position: point(pen_x, sf.ascent()),
        });
        pen_x += sf.h_advance(id);
    }

    // Union of the outlined pixel bounds.
    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for g in &glyphs {
        if let Some(out) = font.outline_glyph(g.clone()) {
            let b = out.px_bounds();
            min_x = min_x.min(b.min.x);
            min_y = min_y.min(b.min.y);
            max_x = max_x.max(b.max.x);
            max_y = max_y.max(b.max.y);
        }
    }

    if min_x == f32::INFINITY {
        return Pixmap::new(1, 1).expect("pixmap");
    }

    let w = (max_x.ceil() - min_x.floor()).max(1.0) as u32;
    let h = (max_y.ceil() - min_y.floor()).max(1.0) as u32;
    let mut pm = Pixmap::new(w, h).expect("pixmap");

    let stride = pm.width() as usize;
    let dst = pm.pixels_mut();

    for g in &glyphs {
        if let Some(out) = font.outline_glyph(g.clone()) {
            let b = out.px_bounds();
            out.draw(|x, y, cov| {
                if cov <= f32::EPSILON {
                    return;
                }
                let fx = x as f32 + b.min.x - min_x;
                let fy = y as f32 + b.min.y - min_y;
                let ix = fx.floor() as i32;
                let iy = fy.floor() as i32;
                if ix < 0 || iy < 0 || ix >= w as i32 || iy >= h as i32 {
                    return;
                }
                let i = iy as usize * stride + ix as usize;
                if i >= dst.len() {
                    return;
                }

                // Premultiply source by (coverage * alpha).
                let a_lin = (cov * color[3] as f32 / 255.0).clamp(0.0, 1.0);
                let sr = (color[0] as f32 * a_lin) as u8;
                let sg = (color[1] as f32 * a_lin) as u8;
                let sb = (color[2] as f32 * a_lin) as u8;
                let sa = (a_lin * 255.0) as u8;
                let Some(src) = PremultipliedColorU8::from_rgba(sr, sg, sb, sa) else {
                    return;
                };
                let bg = dst[i];

                // Porter-Duff over in premultiplied space.
                let inv = 1.0 - (sa as f32 / 255.0);
                let r = src.red().saturating_add((bg.red() as f32 * inv) as u8);
                let g2 = src.green().saturating_add((bg.green() as f32 * inv) as u8);
                let b2 = src.blue().saturating_add((bg.blue() as f32 * inv) as u8);
                let a = src.alpha().saturating_add((bg.alpha() as f32 * inv) as u8);
                if let Some(px) = PremultipliedColorU8::from_rgba(r, g2, b2, a) {
                    dst[i] = px;
                }
            });
        }
    }

    pm
}
