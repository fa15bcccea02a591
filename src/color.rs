use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::CookingStyle;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues,
/// starting at `offset` degrees.
pub fn generate_palette(n: usize, offset: f32) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (offset + (i as f32 / n as f32) * 360.0) % 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: style / model → Color32
// ---------------------------------------------------------------------------

/// Fixed colours for the two cooking styles and for each fitted model curve.
#[derive(Debug, Clone)]
pub struct ColorMap {
    styles: BTreeMap<CookingStyle, Color32>,
    models: Vec<Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Style colours come from a two-hue palette (warm first); model curves
    /// get their own palette shifted away from it.
    pub fn new(n_models: usize) -> Self {
        let styles = CookingStyle::ALL
            .into_iter()
            .zip(generate_palette(CookingStyle::ALL.len(), 20.0))
            .collect();
        ColorMap {
            styles,
            models: generate_palette(n_models, 200.0),
            default_color: Color32::GRAY,
        }
    }

    pub fn style_color(&self, style: CookingStyle) -> Color32 {
        self.styles.get(&style).copied().unwrap_or(self.default_color)
    }

    /// Colour of the `i`-th model curve.
    pub fn model_color(&self, i: usize) -> Color32 {
        self.models.get(i).copied().unwrap_or(self.default_color)
    }

    /// Return the legend entries (style label → colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.styles
            .iter()
            .map(|(s, c)| (s.to_string(), *c))
            .collect()
    }
}
