//! Embedded typeface and its metrics
//!
//! Documents embed DejaVu Sans so that any Unicode text in the configuration
//! (accented Latin, Cyrillic, the `€` sign) reaches the page. The same font
//! files are measured here to align text inside cells.

use rusttype::{point, Font, Scale};

use crate::cli::layout::Style;
use crate::lib::error::Error;

const REGULAR: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
const BOLD: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

const PT_TO_MM: f32 = 25.4 / 72.0;

/// Regular and bold faces, parsed once per document
pub struct Typeface {
    regular: Font<'static>,
    bold: Font<'static>,
}

impl Typeface {
    pub fn load() -> Result<Self, Error> {
        let parse = |name: &str, bytes: &'static [u8]| {
            Font::try_from_bytes(bytes).ok_or_else(|| {
                Error::new("Cannot load font").with_text(format!("embedded font '{}' is unreadable", name))
            })
        };
        Ok(Self {
            regular: parse("DejaVuSans", REGULAR)?,
            bold: parse("DejaVuSans-Bold", BOLD)?,
        })
    }

    /// Font file to embed for `bold` or regular text
    pub fn file(bold: bool) -> &'static [u8] {
        if bold { BOLD } else { REGULAR }
    }

    fn face(&self, style: &Style) -> &Font<'static> {
        if style.bold { &self.bold } else { &self.regular }
    }

    /// Width in millimeters of `text` set in `style`, kerning included
    pub fn width(&self, text: &str, style: &Style) -> f32 {
        let font = self.face(style);
        // rusttype scales to the ascent-descent height, not to the em
        let v = font.v_metrics_unscaled();
        let scale = Scale::uniform(style.size * (v.ascent - v.descent) / font.units_per_em() as f32);
        let points = font
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map_or(0.0, |g| g.position().x + g.unpositioned().h_metrics().advance_width);
        points * PT_TO_MM
    }

    /// Characters of `text` that the font cannot draw
    pub fn missing(&self, text: &str, style: &Style) -> Vec<char> {
        let font = self.face(style);
        text.chars()
            .filter(|c| !c.is_control() && font.glyph(*c).id().0 == 0)
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    macro_rules! close {
        ( $a:expr, $b:expr ) => {
            assert!(($a - $b).abs() < 1e-3, "{} != {}", $a, $b)
        };
    }

    #[test]
    fn covers_european_scripts() {
        let face = Typeface::load().unwrap();
        for style in &[Style::regular(10.0), Style::bold(10.0)] {
            assert!(face.missing("Brīvības iela 1", style).is_empty());
            assert!(face.missing("ООО Ромашка", style).is_empty());
            assert!(face.missing("Zürich, Łódź, €12.50", style).is_empty());
        }
        assert_eq!(face.missing("Invoice 発票", &Style::regular(10.0)), vec!['発', '票']);
    }

    #[test]
    fn widths() {
        let face = Typeface::load().unwrap();
        let regular = Style::regular(10.0);
        close!(face.width("", &regular), 0.0);
        close!(face.width("00", &Style::regular(20.0)), 2.0 * face.width("00", &regular));
        assert!(face.width("Total", &Style::bold(10.0)) > face.width("Total", &regular));
        assert!(face.width("ī", &regular) > 0.0);
        assert!(face.width("Ромашка", &regular) > face.width("Рома", &regular));
    }
}
