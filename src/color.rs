use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            hsl_to_color32(hue, 0.75, 0.55)
        })
        .collect()
}

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Continuous ramps for heat maps
// ---------------------------------------------------------------------------

/// Sequential yellow → green → blue ramp for counts, `t` in `[0, 1]`.
pub fn heat_color(t: f64) -> Color32 {
    let t = t.clamp(0.0, 1.0) as f32;
    hsl_to_color32(60.0 + 160.0 * t, 0.55 + 0.2 * t, 0.88 - 0.55 * t)
}

/// Diverging blue → near-white → red ramp for correlations in `[-1, 1]`.
/// `NaN` (undefined correlation) is drawn grey.
pub fn diverging_color(r: f64) -> Color32 {
    if r.is_nan() {
        return Color32::GRAY;
    }
    let r = r.clamp(-1.0, 1.0) as f32;
    let hue = if r < 0.0 { 220.0 } else { 10.0 };
    hsl_to_color32(hue, 0.7 * r.abs(), 0.92 - 0.42 * r.abs())
}

/// Black or white, whichever reads better on `background`.
pub fn text_on(background: Color32) -> Color32 {
    let luma = 0.299 * background.r() as f32
        + 0.587 * background.g() as f32
        + 0.114 * background.b() as f32;
    if luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

// ---------------------------------------------------------------------------
// Color mapping: category label → Color32
// ---------------------------------------------------------------------------

/// Maps category labels (canonical effects) to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl Default for ColorMap {
    fn default() -> Self {
        Self {
            mapping: BTreeMap::new(),
            default_color: Color32::GRAY,
        }
    }
}

impl ColorMap {
    /// Build a colour map over `labels`, one hue per label in the given order.
    pub fn new(labels: &[String]) -> Self {
        let palette = generate_palette(labels.len());
        let mapping = labels.iter().cloned().zip(palette).collect();
        ColorMap {
            mapping,
            ..Self::default()
        }
    }

    /// Colour of `label`, or the default colour for unknown labels.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.mapping.contains_key(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_colours_are_distinct() {
        let p = generate_palette(6);
        assert_eq!(p.len(), 6);
        for i in 0..p.len() {
            for j in (i + 1)..p.len() {
                assert_ne!(p[i], p[j]);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn color_map_falls_back_for_unknown_labels() {
        let cm = ColorMap::new(&["Allergic Reaction".to_string(), "Other".to_string()]);
        assert!(cm.contains("Other"));
        assert_ne!(cm.color_for("Allergic Reaction"), cm.color_for("Other"));
        assert_eq!(cm.color_for("nope"), Color32::GRAY);
    }

    #[test]
    fn diverging_ramp_marks_undefined_grey() {
        assert_eq!(diverging_color(f64::NAN), Color32::GRAY);
        assert_ne!(diverging_color(1.0), diverging_color(-1.0));
    }

    #[test]
    fn heat_ramp_darkens_with_count() {
        let luma = |c: Color32| c.r() as u32 + c.g() as u32 + c.b() as u32;
        assert!(luma(heat_color(0.0)) > luma(heat_color(1.0)));
        assert_eq!(text_on(heat_color(0.0)), Color32::BLACK);
    }
}
