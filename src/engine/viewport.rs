use eframe::egui::{Vec2, vec2};

use crate::network::Canvas;

pub const MIN_SCALE: f32 = 0.3;
pub const MAX_SCALE: f32 = 3.0;
pub const PAN_PADDING: f32 = 300.0;
pub const ZOOM_SENSITIVITY: f32 = 0.0008;

const MAX_SUBSTEP_SECS: f32 = 1.0 / 120.0;
const MAX_STEP_SECS: f32 = 1.0;
const REST_OFFSET: f32 = 0.001;
const REST_SPEED: f32 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    pub scale: f32,
    pub pan: Vec2,
}

impl ViewTransform {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        pan: Vec2::ZERO,
    };
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringConfig {
    pub tension: f32,
    pub friction: f32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            tension: 250.0,
            friction: 28.0,
        }
    }
}

/// Advances a unit-mass damped spring by `dt` seconds and returns the next
/// `(value, velocity)`. Lands exactly on `target` once at rest.
pub fn spring_step(
    value: f32,
    velocity: f32,
    target: f32,
    dt: f32,
    config: SpringConfig,
) -> (f32, f32) {
    let mut value = value;
    let mut velocity = velocity;
    let mut remaining = dt.max(0.0).min(MAX_STEP_SECS);

    while remaining > 0.0 {
        let h = remaining.min(MAX_SUBSTEP_SECS);
        let force = -config.tension * (value - target) - config.friction * velocity;
        velocity += force * h;
        value += velocity * h;
        remaining -= h;
    }

    if (value - target).abs() < REST_OFFSET && velocity.abs() < REST_SPEED {
        (target, 0.0)
    } else {
        (value, velocity)
    }
}

pub fn clamp_scale(scale: f32) -> f32 {
    if scale.is_nan() {
        return 1.0;
    }
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

pub fn clamp_pan(pan: Vec2, canvas: Canvas) -> Vec2 {
    let limit_x = (canvas.width - PAN_PADDING).max(0.0);
    let limit_y = (canvas.height - PAN_PADDING).max(0.0);
    let x = if pan.x.is_nan() { 0.0 } else { pan.x };
    let y = if pan.y.is_nan() { 0.0 } else { pan.y };
    vec2(x.clamp(-limit_x, limit_x), y.clamp(-limit_y, limit_y))
}

#[derive(Clone, Debug)]
pub struct Viewport {
    canvas: Canvas,
    spring: SpringConfig,
    current: ViewTransform,
    target: ViewTransform,
    scale_velocity: f32,
    pan_velocity: Vec2,
    drag_origin: Option<Vec2>,
}

impl Viewport {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            spring: SpringConfig::default(),
            current: ViewTransform::IDENTITY,
            target: ViewTransform::IDENTITY,
            scale_velocity: 0.0,
            pan_velocity: Vec2::ZERO,
            drag_origin: None,
        }
    }

    pub fn transform(&self) -> ViewTransform {
        self.current
    }

    #[cfg(test)]
    pub fn target(&self) -> ViewTransform {
        self.target
    }

    #[cfg(test)]
    pub fn is_dragging(&self) -> bool {
        self.drag_origin.is_some()
    }

    pub fn is_moving(&self) -> bool {
        self.current != self.target
    }

    /// Grabs the pan where it is displayed, stopping any spring motion on it.
    pub fn begin_drag(&mut self) {
        self.drag_origin = Some(self.grab_pan());
    }

    fn grab_pan(&mut self) -> Vec2 {
        self.target.pan = self.current.pan;
        self.pan_velocity = Vec2::ZERO;
        self.current.pan
    }

    /// `movement` is the total pointer travel since `begin_drag`, in canvas
    /// units. Panning follows the pointer without smoothing.
    pub fn drag_by(&mut self, movement: Vec2) {
        let origin = match self.drag_origin {
            Some(origin) => origin,
            None => {
                let origin = self.grab_pan();
                self.drag_origin = Some(origin);
                origin
            }
        };
        let pan = clamp_pan(origin + movement, self.canvas);
        self.target.pan = pan;
        self.current.pan = pan;
        self.pan_velocity = Vec2::ZERO;
    }

    pub fn end_drag(&mut self) {
        self.drag_origin = None;
    }

    /// Positive `delta` (wheel down) zooms out.
    pub fn zoom_by(&mut self, delta: f32) {
        self.target.scale = clamp_scale(self.target.scale - delta * ZOOM_SENSITIVITY);
    }

    pub fn reset(&mut self) {
        self.drag_origin = None;
        self.target = ViewTransform::IDENTITY;
    }

    /// Moves the displayed transform toward the target. Returns whether
    /// another frame is needed.
    pub fn step(&mut self, dt: f32) -> bool {
        let (scale, scale_velocity) = spring_step(
            self.current.scale,
            self.scale_velocity,
            self.target.scale,
            dt,
            self.spring,
        );
        let (pan_x, velocity_x) = spring_step(
            self.current.pan.x,
            self.pan_velocity.x,
            self.target.pan.x,
            dt,
            self.spring,
        );
        let (pan_y, velocity_y) = spring_step(
            self.current.pan.y,
            self.pan_velocity.y,
            self.target.pan.y,
            dt,
            self.spring,
        );

        // Overshoot is allowed for smoothness but never past the hard limits.
        self.current = ViewTransform {
            scale: clamp_scale(scale),
            pan: clamp_pan(vec2(pan_x, pan_y), self.canvas),
        };
        self.scale_velocity = scale_velocity;
        self.pan_velocity = vec2(velocity_x, velocity_y);
        self.is_moving()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    fn settle(viewport: &mut Viewport) -> usize {
        let mut frames = 0;
        while viewport.step(1.0 / 60.0) {
            frames += 1;
            assert!(frames < 600, "spring never settled");
        }
        frames
    }

    #[test]
    fn spring_lands_on_target() {
        let mut value = 0.0;
        let mut velocity = 0.0;
        for _ in 0..240 {
            (value, velocity) =
                spring_step(value, velocity, 10.0, 1.0 / 60.0, SpringConfig::default());
        }
        assert_eq!((value, velocity), (10.0, 0.0));
    }

    #[test]
    fn spring_moves_gradually() {
        let (value, _) = spring_step(0.0, 0.0, 10.0, 1.0 / 60.0, SpringConfig::default());
        assert!(value > 0.0 && value < 10.0);
    }

    #[test]
    fn drag_is_relative_to_drag_start() {
        let mut viewport = Viewport::new(Canvas::default());
        viewport.begin_drag();
        viewport.drag_by(vec2(50.0, 20.0));
        viewport.drag_by(vec2(80.0, 30.0));
        viewport.end_drag();

        assert_eq!(viewport.transform().pan, vec2(80.0, 30.0));

        viewport.begin_drag();
        viewport.drag_by(vec2(-10.0, 0.0));
        assert_eq!(viewport.transform().pan, vec2(70.0, 30.0));
    }

    #[test]
    fn drag_is_clamped_to_padding_band() {
        let mut viewport = Viewport::new(Canvas::default());
        viewport.begin_drag();
        viewport.drag_by(vec2(10_000.0, -10_000.0));

        assert_eq!(viewport.transform().pan, vec2(1700.0, -900.0));
    }

    #[test]
    fn zoom_is_smoothed_then_settles() {
        let mut viewport = Viewport::new(Canvas::default());
        viewport.zoom_by(-500.0);

        let target = viewport.target().scale;
        assert!((target - 1.4).abs() < 1e-6);
        assert!(viewport.step(1.0 / 60.0));
        assert!(viewport.transform().scale > 1.0 && viewport.transform().scale < target);

        settle(&mut viewport);
        assert_eq!(viewport.transform().scale, target);
    }

    #[test]
    fn reset_returns_to_identity() {
        let mut viewport = Viewport::new(Canvas::default());
        viewport.zoom_by(1_000.0);
        viewport.begin_drag();
        viewport.drag_by(vec2(200.0, 100.0));
        settle(&mut viewport);

        viewport.reset();
        assert!(!viewport.is_dragging());
        settle(&mut viewport);

        assert_eq!(viewport.transform(), ViewTransform::IDENTITY);
    }

    #[test]
    fn grabbing_mid_reset_does_not_jump() {
        let mut viewport = Viewport::new(Canvas::default());
        viewport.begin_drag();
        viewport.drag_by(vec2(800.0, 0.0));
        viewport.end_drag();

        viewport.reset();
        for _ in 0..6 {
            viewport.step(1.0 / 60.0);
        }
        let displayed = viewport.transform().pan;
        assert!(displayed.x > 0.0 && displayed.x < 800.0);

        viewport.begin_drag();
        viewport.drag_by(Vec2::ZERO);
        assert_eq!(viewport.transform().pan, displayed);
        assert_eq!(viewport.target().pan, displayed);

        viewport.drag_by(vec2(10.0, 5.0));
        assert_eq!(viewport.transform().pan, displayed + vec2(10.0, 5.0));
    }

    #[test]
    fn drag_without_begin_starts_from_displayed_pan() {
        let mut viewport = Viewport::new(Canvas::default());
        viewport.begin_drag();
        viewport.drag_by(vec2(400.0, 200.0));
        viewport.end_drag();
        viewport.reset();
        viewport.step(1.0 / 60.0);
        let displayed = viewport.transform().pan;

        viewport.drag_by(Vec2::ZERO);
        assert_eq!(viewport.transform().pan, displayed);
        assert!(viewport.is_dragging());
    }

    #[test]
    fn grab_stops_spring_motion() {
        let mut viewport = Viewport::new(Canvas::default());
        viewport.begin_drag();
        viewport.drag_by(vec2(500.0, -300.0));
        viewport.end_drag();
        viewport.reset();
        viewport.step(1.0 / 60.0);

        viewport.begin_drag();
        let grabbed = viewport.transform().pan;
        viewport.end_drag();
        assert!(!viewport.step(1.0 / 60.0));
        assert_eq!(viewport.transform().pan, grabbed);
    }

    #[test]
    fn unbounded_step_terminates() {
        let (value, velocity) =
            spring_step(0.0, 0.0, 10.0, f32::INFINITY, SpringConfig::default());
        assert!(value.is_finite() && velocity.is_finite());

        let (value, velocity) = spring_step(3.0, 1.0, 10.0, f32::NAN, SpringConfig::default());
        assert_eq!((value, velocity), (3.0, 1.0));
    }

    #[test]
    fn tiny_canvas_pins_pan_to_origin() {
        let canvas = Canvas {
            width: 200.0,
            height: 100.0,
        };
        assert_eq!(clamp_pan(vec2(50.0, -50.0), canvas), Vec2::ZERO);
    }

    proptest! {
        #[test]
        fn scale_stays_in_bounds(deltas in proptest::collection::vec(-1.0e6f32..1.0e6, 1..20)) {
            let mut viewport = Viewport::new(Canvas::default());
            for delta in deltas {
                viewport.zoom_by(delta);
                viewport.step(1.0 / 60.0);
                prop_assert!((MIN_SCALE..=MAX_SCALE).contains(&viewport.target().scale));
                prop_assert!((MIN_SCALE..=MAX_SCALE).contains(&viewport.transform().scale));
            }
        }

        #[test]
        fn pan_stays_in_band(dx in -1.0e6f32..1.0e6, dy in -1.0e6f32..1.0e6) {
            let canvas = Canvas::default();
            let mut viewport = Viewport::new(canvas);
            viewport.begin_drag();
            viewport.drag_by(vec2(dx, dy));
            let pan = viewport.transform().pan;

            prop_assert!(pan.x.abs() <= canvas.width - PAN_PADDING);
            prop_assert!(pan.y.abs() <= canvas.height - PAN_PADDING);
        }
    }
}
