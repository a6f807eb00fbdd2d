use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::core::primitives::settle_unit;
use crate::core::{Momentum, lerp};
use crate::render::{PathCommand, PathPrimitive, RenderFrame, Stroke};

use super::Palette;

/// Period of the chevron pulse.
pub const ARROW_CYCLE_MS: f64 = 1400.0;
const FADE_IN_SPEED: f64 = 0.08;
const FADE_OUT_SPEED: f64 = 0.04;
/// One direction may only start fading in once the other is nearly gone.
const HANDOFF_THRESHOLD: f64 = 0.02;
const MIN_DRAW_OPACITY: f64 = 0.01;
const CHEVRON_OFFSET_X: f64 = 19.0;
const CHEVRON_HALF_WIDTH: f64 = 5.0;
const CHEVRON_DEPTH: f64 = 3.5;
const CHEVRON_SPACING: f64 = 8.0;
const CHEVRON_STAGGER: f64 = 0.2;
const CHEVRON_PULSE: f64 = 0.35;

/// Opacity of the up and down chevron pairs beside the live dot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ArrowState {
    pub up: f64,
    pub down: f64,
}

impl ArrowState {
    /// Cross-fades toward the chevrons for `momentum`. A direction cannot
    /// appear until the opposite one has faded out.
    pub fn advance(&mut self, momentum: Momentum, dt_ms: f64) {
        let up_target = if momentum == Momentum::Up { 1.0 } else { 0.0 };
        let down_target = if momentum == Momentum::Down { 1.0 } else { 0.0 };
        let can_up = self.down < HANDOFF_THRESHOLD;
        let can_down = self.up < HANDOFF_THRESHOLD;

        self.up = settle(lerp(
            self.up,
            if can_up { up_target } else { 0.0 },
            if up_target > self.up {
                FADE_IN_SPEED
            } else {
                FADE_OUT_SPEED
            },
            dt_ms,
        ));
        self.down = settle(lerp(
            self.down,
            if can_down { down_target } else { 0.0 },
            if down_target > self.down {
                FADE_IN_SPEED
            } else {
                FADE_OUT_SPEED
            },
            dt_ms,
        ));
    }

    /// Pushes the chevrons beside the live dot at `(x, y)`.
    pub fn draw(&self, frame: &mut RenderFrame, x: f64, y: f64, palette: &Palette, wall_ms: f64) {
        let cycle = wall_ms.rem_euclid(ARROW_CYCLE_MS) / ARROW_CYCLE_MS;
        let base_x = x + CHEVRON_OFFSET_X;
        push_chevrons(frame, base_x, y, -1.0, self.up, cycle, palette);
        push_chevrons(frame, base_x, y, 1.0, self.down, cycle, palette);
    }
}

fn settle(value: f64) -> f64 {
    settle_unit(value, 0.01, 0.99)
}

fn push_chevrons(
    frame: &mut RenderFrame,
    base_x: f64,
    y: f64,
    direction: f64,
    opacity: f64,
    cycle: f64,
    palette: &Palette,
) {
    if opacity < MIN_DRAW_OPACITY {
        return;
    }
    let nudge = if direction < 0.0 { -3.0 } else { 3.0 };
    let stroke = Stroke::solid(palette.grid_label, 2.5).rounded();

    for index in 0..2 {
        let start = f64::from(index) * CHEVRON_STAGGER;
        let local = cycle - start;
        let wave = if (0.0..CHEVRON_PULSE).contains(&local) {
            (local / CHEVRON_PULSE * PI).sin()
        } else {
            0.0
        };
        let alpha = opacity * (0.3 + 0.7 * wave);
        let cy = y + direction * (f64::from(index) * CHEVRON_SPACING - 4.0) + nudge;
        let wing_y = cy - direction * CHEVRON_DEPTH;

        frame.path(
            PathPrimitive::new(vec![
                PathCommand::MoveTo {
                    x: base_x - CHEVRON_HALF_WIDTH,
                    y: wing_y,
                },
                PathCommand::LineTo { x: base_x, y: cy },
                PathCommand::LineTo {
                    x: base_x + CHEVRON_HALF_WIDTH,
                    y: wing_y,
                },
            ])
            .with_stroke(stroke)
            .with_alpha(alpha.clamp(0.0, 1.0)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::ArrowState;
    use crate::api::Palette;
    use crate::core::{Momentum, Size};
    use crate::render::RenderFrame;

    #[test]
    fn up_momentum_fades_up_arrows_in() {
        let mut arrows = ArrowState::default();
        for _ in 0..200 {
            arrows.advance(Momentum::Up, 16.67);
        }
        assert_eq!(arrows.up, 1.0);
        assert_eq!(arrows.down, 0.0);
    }

    #[test]
    fn reversal_waits_for_the_opposite_direction() {
        let mut arrows = ArrowState { up: 1.0, down: 0.0 };
        arrows.advance(Momentum::Down, 16.67);
        assert_eq!(arrows.down, 0.0);
        assert!(arrows.up < 1.0);
        for _ in 0..400 {
            arrows.advance(Momentum::Down, 16.67);
        }
        assert_eq!(arrows.up, 0.0);
        assert_eq!(arrows.down, 1.0);
    }

    #[test]
    fn hidden_arrows_draw_nothing() {
        let arrows = ArrowState::default();
        let mut frame = RenderFrame::new(Size::new(200.0, 100.0), 1.0);
        arrows.draw(&mut frame, 100.0, 50.0, &Palette::default(), 0.0);
        assert!(frame.is_empty());

        let shown = ArrowState { up: 1.0, down: 0.0 };
        shown.draw(&mut frame, 100.0, 50.0, &Palette::default(), 0.0);
        assert_eq!(frame.paths().count(), 2);
        frame.validate().expect("valid frame");
    }
}
