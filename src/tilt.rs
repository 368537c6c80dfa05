use crate::math::map_range;
use crate::spring::{SpringConfig, SpringTask};
use std::time::Duration;
use tracing::trace;

/// Raw pointer offsets are divided by this before mapping to an angle
pub const DAMPING_DIVISOR: f64 = 5.0;
/// Half-width of the working range mapped onto the tilt angles
pub const INPUT_DOMAIN: f64 = 50.0;

/// Rectangle of the tracked surface, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceBounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl SurfaceBounds {
    pub fn center(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x < self.left + self.width && y >= self.top && y < self.top + self.height
    }
}

/// Signed offset of the pointer from the surface centre
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerOffset {
    pub dx: f64,
    pub dy: f64,
}

impl PointerOffset {
    pub fn from_pointer(pointer: (f64, f64), bounds: &SurfaceBounds) -> Self {
        let (cx, cy) = bounds.center();
        PointerOffset {
            dx: pointer.0 - cx,
            dy: pointer.1 - cy,
        }
    }
}

/// Rotation of the card in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TiltState {
    /// Rotation about the horizontal axis, driven by vertical pointer offset
    pub rotate_x: f64,
    /// Rotation about the vertical axis, driven by horizontal pointer offset
    pub rotate_y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TiltConfig {
    /// Symmetric bound of both output angles, in degrees
    pub max_angle: f64,
    pub damping_divisor: f64,
    pub input_domain: f64,
    pub spring: SpringConfig,
}

impl Default for TiltConfig {
    fn default() -> Self {
        TiltConfig {
            max_angle: 10.0,
            damping_divisor: DAMPING_DIVISOR,
            input_domain: INPUT_DOMAIN,
            spring: SpringConfig::default(),
        }
    }
}

impl TiltConfig {
    pub fn with_max_angle(max_angle: f64) -> Self {
        TiltConfig {
            max_angle,
            ..TiltConfig::default()
        }
    }
}

/// Maps pointer movement over a surface to a bounded 3D tilt and springs
/// back to rest once the pointer leaves.
///
/// The controller holds two working values (the damped pointer offsets).
/// While tracking they are written directly by [`on_pointer_move`]; after
/// [`on_pointer_leave`] they are owned by a [`SpringTask`] advanced through
/// [`tick`]. A move always drops the task before writing, so the spring and
/// the pointer never both write in the same frame.
///
/// [`on_pointer_move`]: PointerTiltController::on_pointer_move
/// [`on_pointer_leave`]: PointerTiltController::on_pointer_leave
/// [`tick`]: PointerTiltController::tick
#[derive(Debug, Clone)]
pub struct PointerTiltController {
    config: TiltConfig,
    x: f64,
    y: f64,
    velocity: (f64, f64),
    relaxation: Option<SpringTask>,
}

impl PointerTiltController {
    pub fn new(config: TiltConfig) -> Self {
        PointerTiltController {
            config,
            x: 0.0,
            y: 0.0,
            velocity: (0.0, 0.0),
            relaxation: None,
        }
    }

    pub fn config(&self) -> &TiltConfig {
        &self.config
    }

    /// Tracks the pointer directly. Unmeasurable bounds make this a no-op.
    pub fn on_pointer_move(&mut self, pointer: (f64, f64), bounds: Option<SurfaceBounds>) {
        let Some(bounds) = bounds else {
            return;
        };
        if self.cancel_relaxation() {
            trace!("relaxation cancelled by pointer move");
        }
        let offset = PointerOffset::from_pointer(pointer, &bounds);
        self.x = offset.dx / self.config.damping_divisor;
        self.y = offset.dy / self.config.damping_divisor;
        self.velocity = (0.0, 0.0);
    }

    /// Starts springing both working values back to zero.
    pub fn on_pointer_leave(&mut self) {
        let task = SpringTask::toward_rest(self.config.spring, (self.x, self.y), self.velocity);
        if task.is_settled() {
            self.reset();
            return;
        }
        let spring = &self.config.spring;
        let energy = spring.energy(self.x, self.velocity.0) + spring.energy(self.y, self.velocity.1);
        trace!(x = self.x, y = self.y, energy, "relaxation started");
        self.relaxation = Some(task);
    }

    /// Advances a running relaxation by one frame. Returns whether the
    /// relaxation is still running afterwards.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let Some(task) = self.relaxation.as_mut() else {
            return false;
        };
        let frame = task.advance(dt);
        (self.x, self.y) = frame.position;
        self.velocity = frame.velocity;
        if frame.settled {
            trace!(elapsed = ?task.elapsed(), "relaxation settled");
            self.relaxation = None;
        }
        !frame.settled
    }

    /// Drops any in-flight relaxation, leaving the working values where the
    /// spring last put them. Returns whether one was running.
    pub fn cancel_relaxation(&mut self) -> bool {
        self.velocity = (0.0, 0.0);
        self.relaxation.take().is_some()
    }

    pub fn is_relaxing(&self) -> bool {
        self.relaxation.is_some()
    }

    /// The damped pointer offsets currently driving the tilt
    pub fn working_values(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Velocity of the working values, non-zero only while relaxing
    pub fn velocity(&self) -> (f64, f64) {
        self.velocity
    }

    pub fn tilt(&self) -> TiltState {
        let max = self.config.max_angle;
        let domain = (-self.config.input_domain, self.config.input_domain);
        TiltState {
            rotate_x: map_range(self.y, domain, (max, -max)).clamp(-max, max),
            rotate_y: map_range(self.x, domain, (-max, max)).clamp(-max, max),
        }
    }

    pub fn reset(&mut self) {
        self.relaxation = None;
        self.x = 0.0;
        self.y = 0.0;
        self.velocity = (0.0, 0.0);
    }
}
