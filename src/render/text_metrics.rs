/// Measures label advance widths for layout decisions made before drawing.
pub trait TextMeasurer {
    fn measure_text(&self, text: &str, font_size_px: f64) -> f64;
}

/// Deterministic, backend-independent width estimate for monospace-ish
/// label fonts.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatedTextMeasurer;

impl TextMeasurer for EstimatedTextMeasurer {
    fn measure_text(&self, text: &str, font_size_px: f64) -> f64 {
        let units = text.chars().fold(0.0, |acc, ch| {
            acc + match ch {
                '0'..='9' => 0.62,
                '.' | ',' => 0.34,
                '-' | '+' | '%' => 0.42,
                ' ' => 0.33,
                _ => 0.58,
            }
        });
        units * font_size_px
    }
}

#[cfg(test)]
mod tests {
    use super::{EstimatedTextMeasurer, TextMeasurer};

    #[test]
    fn digits_measure_alike() {
        let measurer = EstimatedTextMeasurer;
        assert_eq!(
            measurer.measure_text("1111", 11.0),
            measurer.measure_text("8888", 11.0)
        );
        assert_eq!(measurer.measure_text("", 11.0), 0.0);
    }
}
