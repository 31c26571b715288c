//! Monospace metrics for screenplay layout
//!
//! Screenplays are set in a 12pt fixed-pitch face, so every measurement
//! reduces to whole character columns and whole lines.

/// Tolerance for float rounding when converting points to cells
const EPSILON: f32 = 1e-3;

/// Metrics of the screenplay font
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    /// Advance width of one character in points
    pub char_width_pt: f32,
    /// Line height in points
    pub line_height_pt: f32,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self::COURIER_12
    }
}

impl TextMetrics {
    /// 12pt Courier: 10 characters per inch, 6 lines per inch
    pub const COURIER_12: TextMetrics = TextMetrics {
        char_width_pt: 7.2,
        line_height_pt: 12.0,
    };

    pub fn new(char_width_pt: f32, line_height_pt: f32) -> Self {
        Self {
            char_width_pt,
            line_height_pt,
        }
    }

    /// Both dimensions are finite and positive
    pub fn is_valid(&self) -> bool {
        self.char_width_pt.is_finite()
            && self.line_height_pt.is_finite()
            && self.char_width_pt > 0.0
            && self.line_height_pt > 0.0
    }

    /// Whole characters that fit in `width_pt`
    pub fn chars_for_width(&self, width_pt: f32) -> u32 {
        cells(width_pt, self.char_width_pt)
    }

    /// Whole lines that fit in `height_pt`
    pub fn lines_for_height(&self, height_pt: f32) -> u32 {
        cells(height_pt, self.line_height_pt)
    }

    /// Width in points of `chars` characters
    pub fn width_of(&self, chars: u32) -> f32 {
        chars as f32 * self.char_width_pt
    }
}

fn cells(extent: f32, cell: f32) -> u32 {
    if !extent.is_finite() || extent <= 0.0 || cell <= 0.0 {
        return 0;
    }
    (extent / cell + EPSILON).floor() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_courier_grid() {
        let m = TextMetrics::COURIER_12;
        // 6" text column
        assert_eq!(m.chars_for_width(432.0), 60);
        // 9" of page height
        assert_eq!(m.lines_for_height(648.0), 54);
        assert_eq!(m.width_of(10), 72.0);
    }

    #[test]
    fn test_degenerate_extents() {
        let m = TextMetrics::default();
        assert_eq!(m.chars_for_width(-5.0), 0);
        assert_eq!(m.chars_for_width(f32::NAN), 0);
        assert_eq!(m.lines_for_height(11.9), 0);
        assert!(!TextMetrics::new(0.0, 12.0).is_valid());
        assert!(!TextMetrics::new(7.2, f32::INFINITY).is_valid());
    }
}
