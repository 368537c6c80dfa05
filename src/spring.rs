//! Damped spring used to relax the tilt card back to rest.
//!
//! The spring is evaluated in closed form rather than integrated, so a
//! relaxation sampled at uneven frame intervals follows exactly the same
//! trajectory as one sampled every 16 ms.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringConfig {
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
    /// Distance from the target under which the spring may come to rest
    pub rest_delta: f64,
    /// Speed under which the spring may come to rest
    pub rest_speed: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        SpringConfig {
            stiffness: 120.0,
            damping: 12.0,
            mass: 1.0,
            rest_delta: 0.01,
            rest_speed: 0.05,
        }
    }
}

impl SpringConfig {
    /// Undamped angular frequency, in rad/s
    pub fn natural_frequency(&self) -> f64 {
        (self.stiffness / self.mass).sqrt()
    }

    pub fn damping_ratio(&self) -> f64 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }

    /// Mass-normalized energy of a spring displaced by `position` and moving at `velocity`.
    ///
    /// Never increases while the spring runs freely.
    pub fn energy(&self, position: f64, velocity: f64) -> f64 {
        let omega = self.natural_frequency();
        position * position + (velocity * velocity) / (omega * omega)
    }

    fn at_rest(&self, position: f64, velocity: f64) -> bool {
        position.abs() < self.rest_delta && velocity.abs() < self.rest_speed
    }
}

/// One axis of a spring animating from `origin` toward zero
#[derive(Debug, Clone, Copy)]
pub struct Spring {
    config: SpringConfig,
    origin: f64,
    initial_velocity: f64,
}

impl Spring {
    pub fn new(config: SpringConfig, origin: f64, initial_velocity: f64) -> Self {
        Spring {
            config,
            origin,
            initial_velocity,
        }
    }

    /// Position and velocity `t` seconds after release
    pub fn sample(&self, t: f64) -> (f64, f64) {
        let omega = self.config.natural_frequency();
        let zeta = self.config.damping_ratio();
        let (x0, v0) = (self.origin, self.initial_velocity);

        if (zeta - 1.0).abs() < 1e-9 {
            let decay = (-omega * t).exp();
            let b = v0 + omega * x0;
            return (decay * (x0 + b * t), decay * (v0 - omega * t * b));
        }

        if zeta < 1.0 {
            let omega_d = omega * (1.0 - zeta * zeta).sqrt();
            let a = x0;
            let b = (v0 + zeta * omega * x0) / omega_d;
            let decay = (-zeta * omega * t).exp();
            let (sin, cos) = (omega_d * t).sin_cos();
            let position = decay * (a * cos + b * sin);
            let velocity = decay * (-zeta * omega * (a * cos + b * sin) + omega_d * (b * cos - a * sin));
            return (position, velocity);
        }

        let root = (zeta * zeta - 1.0).sqrt();
        let r1 = -omega * (zeta - root);
        let r2 = -omega * (zeta + root);
        let c2 = (v0 - r1 * x0) / (r2 - r1);
        let c1 = x0 - c2;
        let (e1, e2) = ((r1 * t).exp(), (r2 * t).exp());
        (c1 * e1 + c2 * e2, r1 * c1 * e1 + r2 * c2 * e2)
    }
}

/// A frame of a running [`SpringTask`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringFrame {
    pub position: (f64, f64),
    pub velocity: (f64, f64),
    pub settled: bool,
}

/// Relaxation of a two-axis value toward `(0, 0)`.
///
/// The task owns its clock; whoever holds it advances it once per frame and
/// cancels it by dropping it.
#[derive(Debug, Clone)]
pub struct SpringTask {
    x: Spring,
    y: Spring,
    config: SpringConfig,
    elapsed: Duration,
    settled: bool,
}

impl SpringTask {
    pub fn toward_rest(config: SpringConfig, from: (f64, f64), velocity: (f64, f64)) -> Self {
        let settled = config.at_rest(from.0, velocity.0) && config.at_rest(from.1, velocity.1);
        SpringTask {
            x: Spring::new(config, from.0, velocity.0),
            y: Spring::new(config, from.1, velocity.1),
            config,
            elapsed: Duration::ZERO,
            settled,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Advances the animation by `dt`. Once both axes are at rest the frame
    /// snaps to exactly zero and every later frame stays there.
    pub fn advance(&mut self, dt: Duration) -> SpringFrame {
        if self.settled {
            return SpringFrame {
                position: (0.0, 0.0),
                velocity: (0.0, 0.0),
                settled: true,
            };
        }
        self.elapsed += dt;
        let t = self.elapsed.as_secs_f64();
        let (x, vx) = self.x.sample(t);
        let (y, vy) = self.y.sample(t);
        if self.config.at_rest(x, vx) && self.config.at_rest(y, vy) {
            self.settled = true;
            return SpringFrame {
                position: (0.0, 0.0),
                velocity: (0.0, 0.0),
                settled: true,
            };
        }
        SpringFrame {
            position: (x, y),
            velocity: (vx, vy),
            settled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(16);

    #[test]
    fn default_spring_is_underdamped() {
        let config = SpringConfig::default();
        assert!(config.damping_ratio() < 1.0);
        assert!((config.natural_frequency() - 120f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn sample_starts_at_origin() {
        for damping in [12.0, 2.0 * 120f64.sqrt(), 40.0] {
            let config = SpringConfig {
                damping,
                ..SpringConfig::default()
            };
            let (x, v) = Spring::new(config, 7.5, -3.0).sample(0.0);
            assert!((x - 7.5).abs() < 1e-9, "damping {damping}: {x}");
            assert!((v + 3.0).abs() < 1e-9, "damping {damping}: {v}");
        }
    }

    #[test]
    fn energy_never_increases() {
        for damping in [12.0, 2.0 * 120f64.sqrt(), 40.0] {
            let config = SpringConfig {
                damping,
                ..SpringConfig::default()
            };
            let spring = Spring::new(config, 50.0, 0.0);
            let mut last = f64::INFINITY;
            for frame in 0..300 {
                let (x, v) = spring.sample(frame as f64 * 0.016);
                let energy = config.energy(x, v);
                assert!(energy <= last + 1e-9, "frame {frame}: {energy} > {last}");
                last = energy;
            }
        }
    }

    #[test]
    fn task_settles_to_exact_zero() {
        let mut task = SpringTask::toward_rest(SpringConfig::default(), (50.0, -30.0), (0.0, 0.0));
        let mut frames = 0;
        let last = loop {
            let frame = task.advance(FRAME);
            frames += 1;
            if frame.settled || frames > 1000 {
                break frame;
            }
        };
        assert!(last.settled);
        assert_eq!(last.position, (0.0, 0.0));
        assert!(frames < 300, "took {frames} frames");
        assert_eq!(task.advance(FRAME).position, (0.0, 0.0));
    }

    #[test]
    fn task_from_rest_is_already_settled() {
        let task = SpringTask::toward_rest(SpringConfig::default(), (0.0, 0.0), (0.0, 0.0));
        assert!(task.is_settled());
    }
}
