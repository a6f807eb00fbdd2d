use approx::{assert_abs_diff_eq, assert_relative_eq};
use liveline::api::{
    EngineState, FrameClock, LivelineConfig, ReferenceLine, SkipReason, TickInput, TickOutcome,
    tick,
};
use liveline::core::{
    ChartLayout, Momentum, Padding, Sample, Size, ValueRange, window_buffer, window_edges,
};
use liveline::render::{DrawCommand, EstimatedTextMeasurer};

const FRAME_MS: f64 = 16.67;

fn samples(points: &[(f64, f64)]) -> Vec<Sample> {
    points
        .iter()
        .map(|(time, value)| Sample::new(*time, *value))
        .collect()
}

fn ramp(count: usize, value: f64) -> Vec<Sample> {
    (0..count).map(|i| Sample::new(i as f64, value)).collect()
}

fn input(monotonic_ms: f64, wall_ms: f64) -> TickInput<'static> {
    TickInput {
        size: Size::new(400.0, 200.0),
        pixel_ratio: 1.0,
        clock: FrameClock::new(monotonic_ms, wall_ms),
        dt_ms: FRAME_MS,
        hover_x: None,
        reduced_motion: false,
        measurer: &EstimatedTextMeasurer,
    }
}

fn drawn(outcome: &TickOutcome) -> &liveline::api::DrawnFrame {
    outcome.drawn().expect("tick should draw")
}

#[test]
fn display_value_and_range_converge_on_a_jump() {
    let data = samples(&[(0.0, 10.0), (1.0, 10.0), (2.0, 50.0)]);
    let mut state = EngineState::new(&LivelineConfig::new(data.clone(), 10.0).with_window(2.0));
    let config = LivelineConfig::new(data, 50.0).with_window(2.0);

    let mut last = None;
    for frame in 0..300 {
        let ms = f64::from(frame) * FRAME_MS;
        let outcome = tick(&mut state, &config, &input(ms, 2_000.0));
        last = Some(drawn(&outcome).clone());
    }
    let last = last.expect("frames drawn");
    assert_eq!(last.display_value, 50.0);
    assert!(last.display_range.max >= 50.0);
    assert!(last.display_range.min <= 10.0);
    // Fewer than five samples never classify as a trend.
    assert_eq!(last.momentum, Momentum::Flat);
}

#[test]
fn rising_tail_reports_up_momentum() {
    let data = samples(&[
        (0.0, 10.0),
        (0.5, 10.0),
        (1.0, 10.0),
        (1.5, 10.0),
        (2.0, 50.0),
    ]);
    let config = LivelineConfig::new(data, 50.0).with_window(2.0);
    let mut state = EngineState::new(&config);
    let outcome = tick(&mut state, &config, &input(0.0, 2_000.0));
    assert_eq!(drawn(&outcome).momentum, Momentum::Up);
}

#[test]
fn reduced_motion_snaps_display_value() {
    let data = ramp(20, 10.0);
    let mut state = EngineState::new(&LivelineConfig::new(data.clone(), 10.0));
    let calm = LivelineConfig::new(data.clone(), 10.0);
    tick(&mut state, &calm, &input(0.0, 19_000.0));

    let jumped = LivelineConfig::new(data, 20.0);
    let mut reduced = input(FRAME_MS, 19_016.0);
    reduced.reduced_motion = true;
    let outcome = tick(&mut state, &jumped, &reduced);
    assert_eq!(drawn(&outcome).display_value, 20.0);
    assert_eq!(state.display_value(), 20.0);
    assert_eq!(state.display_range(), state.target_range());
}

#[test]
fn value_eases_without_reduced_motion() {
    let data = ramp(20, 10.0);
    let mut state = EngineState::new(&LivelineConfig::new(data.clone(), 10.0));
    tick(&mut state, &LivelineConfig::new(data.clone(), 10.0), &input(0.0, 19_000.0));
    let outcome = tick(
        &mut state,
        &LivelineConfig::new(data, 20.0),
        &input(FRAME_MS, 19_016.0),
    );
    let value = drawn(&outcome).display_value;
    assert!(value > 10.0 && value < 20.0);
}

#[test]
fn hover_between_samples_interpolates() {
    let data = samples(&[(10.0, 4.0), (20.0, 8.0)]);
    let config = LivelineConfig::new(data, 8.0);
    let mut state = EngineState::new(&config);

    let size = Size::new(400.0, 200.0);
    let padding = Padding::default();
    let buffer = window_buffer(size.width - padding.left - padding.right, true);
    let edges = window_edges(20.0, config.window_secs, buffer);
    let layout = ChartLayout::new(size, padding, edges, ValueRange::new(0.0, 10.0));

    let mut hovering = input(0.0, 20_000.0);
    hovering.hover_x = Some(layout.to_x(15.0));
    let outcome = tick(&mut state, &config, &hovering);
    let point = drawn(&outcome).hover.expect("hover point");
    assert_abs_diff_eq!(point.time, 15.0, epsilon = 1e-9);
    assert_abs_diff_eq!(point.value, 6.0, epsilon = 1e-9);
}

#[test]
fn window_transition_lands_exactly_on_target() {
    let data = ramp(120, 5.0);
    let short = LivelineConfig::new(data.clone(), 5.0).with_window(30.0);
    let long = LivelineConfig::new(data, 5.0).with_window(60.0);
    let mut state = EngineState::new(&short);

    tick(&mut state, &short, &input(0.0, 119_000.0));
    tick(&mut state, &long, &input(1_000.0, 119_000.0));
    assert!(state.is_transitioning());

    let mid = tick(&mut state, &long, &input(1_375.0, 119_000.0));
    let expected_mid = (30.0f64 * 60.0).sqrt();
    assert_relative_eq!(drawn(&mid).window_secs, expected_mid, epsilon = 1e-9);

    let end = tick(&mut state, &long, &input(1_750.0, 119_000.0));
    assert_eq!(drawn(&end).window_secs, 60.0);
    assert!(!state.is_transitioning());
    assert_eq!(state.display_window(), 60.0);
}

#[test]
fn reduced_motion_completes_transition_in_one_tick() {
    let data = ramp(120, 5.0);
    let short = LivelineConfig::new(data.clone(), 5.0).with_window(30.0);
    let long = LivelineConfig::new(data, 5.0).with_window(90.0);
    let mut state = EngineState::new(&short);
    tick(&mut state, &short, &input(0.0, 119_000.0));

    let mut reduced = input(FRAME_MS, 119_000.0);
    reduced.reduced_motion = true;
    let outcome = tick(&mut state, &long, &reduced);
    assert_eq!(drawn(&outcome).window_secs, 90.0);
    assert!(!state.is_transitioning());
}

#[test]
fn skips_without_enough_data() {
    let mut state = EngineState::new(&LivelineConfig::default());

    let single = LivelineConfig::new(samples(&[(1.0, 1.0)]), 1.0);
    assert_eq!(
        tick(&mut state, &single, &input(0.0, 1_000.0)).skip_reason(),
        Some(SkipReason::NotEnoughData)
    );

    let stale = LivelineConfig::new(samples(&[(0.0, 1.0), (1.0, 2.0)]), 2.0);
    assert_eq!(
        tick(&mut state, &stale, &input(0.0, 1_000_000.0)).skip_reason(),
        Some(SkipReason::NotEnoughVisibleData)
    );

    let mut empty = input(0.0, 1_000.0);
    empty.size = Size::new(0.0, 200.0);
    assert_eq!(
        tick(&mut state, &stale, &empty).skip_reason(),
        Some(SkipReason::EmptySurface)
    );
}

#[test]
fn recovers_once_data_arrives() {
    let mut state = EngineState::new(&LivelineConfig::default());
    let sparse = LivelineConfig::new(samples(&[(9.0, 1.0)]), 1.0);
    assert!(!tick(&mut state, &sparse, &input(0.0, 10_000.0)).is_drawn());

    let full = LivelineConfig::new(samples(&[(8.0, 1.0), (9.0, 2.0)]), 2.0);
    assert!(tick(&mut state, &full, &input(FRAME_MS, 10_000.0)).is_drawn());
}

#[test]
fn frame_keeps_clip_stack_balanced_and_ends_with_edge_fade() {
    let config = LivelineConfig::new(ramp(30, 3.0), 3.0).with_reference_line(ReferenceLine {
        value: 3.0,
        label: Some("open".to_owned()),
    });
    let mut state = EngineState::new(&config);
    let outcome = tick(&mut state, &config, &input(0.0, 29_000.0));
    let frame = &drawn(&outcome).frame;

    let mut depth = 0i32;
    for command in &frame.commands {
        match command {
            DrawCommand::PushClip(_) => depth += 1,
            DrawCommand::PopClip => depth -= 1,
            _ => {}
        }
        assert!(depth >= 0);
    }
    assert_eq!(depth, 0);
    assert!(matches!(
        frame.commands.last(),
        Some(DrawCommand::EdgeFade(_))
    ));
    assert!(frame.validate().is_ok());
    assert!(frame.texts().any(|text| text.text == "open"));
}

#[test]
fn value_readout_follows_momentum_color() {
    let data = samples(&[
        (0.0, 10.0),
        (1.0, 10.0),
        (2.0, 10.0),
        (3.0, 10.0),
        (4.0, 9.0),
        (5.0, -20.0),
    ]);
    let mut config = LivelineConfig::new(data, -20.0).with_window(5.0);
    config.show_value = true;
    config.value_momentum_color = true;
    let mut state = EngineState::new(&config);
    let outcome = tick(&mut state, &config, &input(0.0, 5_000.0));
    let readout = drawn(&outcome).readout.clone().expect("readout");
    assert_eq!(readout.text, "20.00");
    assert_eq!(readout.color, Some(config.palette.dot_down));
}
