//! Parametric motion models evaluated from elapsed time.
//!
//! Every evaluator is a pure function of its parameters and the elapsed time.
//! Degenerate inputs (zero duration, zero radius, empty track) resolve to the
//! final point of the motion instead of producing NaN.

use std::f32::consts::TAU;

use crate::{Vec3, vec3};

/// Height at which track-following models are pinned.
pub const RIDE_HEIGHT: f32 = 0.8;

/// Cubic Bézier curve with its own playback duration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BezierCurve {
    pub p0: Vec3,
    pub p1: Vec3,
    pub p2: Vec3,
    pub p3: Vec3,
    /// Seconds to traverse the curve once.
    pub duration: f32,
    pub looping: bool,
}

impl BezierCurve {
    pub fn new(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, duration: f32, looping: bool) -> Self {
        Self {
            p0,
            p1,
            p2,
            p3,
            duration,
            looping,
        }
    }

    /// B(t) = (1-t)^3 P0 + 3(1-t)^2 t P1 + 3(1-t) t^2 P2 + t^3 P3
    pub fn point(&self, t: f32) -> Vec3 {
        let u = 1.0 - t;
        let uu = u * u;
        let tt = t * t;
        self.p0 * (uu * u) + self.p1 * (3.0 * uu * t) + self.p2 * (3.0 * u * tt) + self.p3 * (tt * t)
    }

    /// Analytic derivative dB/dt (not normalized).
    pub fn derivative(&self, t: f32) -> Vec3 {
        let u = 1.0 - t;
        (self.p1 - self.p0) * (3.0 * u * u)
            + (self.p2 - self.p1) * (6.0 * u * t)
            + (self.p3 - self.p2) * (3.0 * t * t)
    }

    /// Map elapsed seconds onto the curve parameter in [0, 1].
    pub fn normalized_time(&self, elapsed: f32) -> f32 {
        if !(self.duration > 0.0) || !self.duration.is_finite() || !elapsed.is_finite() {
            return 1.0;
        }
        if self.looping {
            elapsed.rem_euclid(self.duration) / self.duration
        } else {
            (elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    pub fn position_at(&self, elapsed: f32) -> Vec3 {
        self.point(self.normalized_time(elapsed))
    }
}

/// Position and unit heading sampled from a track. `direction` is always unit length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackSample {
    pub position: Vec3,
    pub direction: Vec3,
}

/// Sequence of Bézier segments played back to back.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BezierTrack {
    pub segments: Vec<BezierCurve>,
    pub looping: bool,
}

impl BezierTrack {
    pub fn new(segments: Vec<BezierCurve>, looping: bool) -> Self {
        Self { segments, looping }
    }

    /// Oval drift circuit used by `ANIMATION track`: two straights joined by two bends.
    pub fn drift_circuit() -> Self {
        let h = RIDE_HEIGHT;
        let seg = |p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3| BezierCurve::new(p0, p1, p2, p3, 4.0, false);
        Self::new(
            vec![
                seg(vec3(12.0, h, -8.0), vec3(12.0, h, -2.0), vec3(12.0, h, 2.0), vec3(12.0, h, 8.0)),
                seg(vec3(12.0, h, 8.0), vec3(8.0, h, 12.0), vec3(-8.0, h, 12.0), vec3(-12.0, h, 8.0)),
                seg(vec3(-12.0, h, 8.0), vec3(-12.0, h, 2.0), vec3(-12.0, h, -2.0), vec3(-12.0, h, -8.0)),
                seg(vec3(-12.0, h, -8.0), vec3(-8.0, h, -12.0), vec3(8.0, h, -12.0), vec3(12.0, h, -8.0)),
            ],
            true,
        )
    }

    pub fn total_duration(&self) -> f32 {
        self.segments.iter().map(|s| s.duration.max(0.0)).sum()
    }

    pub fn sample(&self, elapsed: f32) -> TrackSample {
        let Some(last) = self.segments.last() else {
            return TrackSample {
                position: Vec3::ZERO,
                direction: Vec3::Z,
            };
        };

        let total = self.total_duration();
        if !(total > 0.0) || !total.is_finite() || !elapsed.is_finite() {
            return Self::sample_segment(last, 1.0);
        }

        let t = if self.looping {
            elapsed.rem_euclid(total)
        } else {
            elapsed.clamp(0.0, total)
        };

        let mut accumulated = 0.0;
        for segment in &self.segments {
            let duration = segment.duration.max(0.0);
            if t <= accumulated + duration {
                let local = if duration > 0.0 {
                    ((t - accumulated) / duration).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                return Self::sample_segment(segment, local);
            }
            accumulated += duration;
        }

        // Float accumulation can leave `t` a hair past the last boundary.
        Self::sample_segment(last, 1.0)
    }

    fn sample_segment(segment: &BezierCurve, t: f32) -> TrackSample {
        let direction = segment
            .derivative(t)
            .try_normalize()
            .or_else(|| (segment.p3 - segment.p2).try_normalize())
            .unwrap_or(Vec3::Z);
        TrackSample {
            position: segment.point(t),
            direction,
        }
    }
}

/// Plane a circular orbit lies in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrbitPlane {
    Xz,
    Xy,
    Yz,
}

/// Circular motion around a center point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orbit {
    pub center: Vec3,
    pub radius: f32,
    /// Angular speed in degrees per second.
    pub speed_deg: f32,
    pub axis: Vec3,
}

impl Orbit {
    pub fn new(center: Vec3, radius: f32, speed_deg: f32) -> Self {
        Self {
            center,
            radius,
            speed_deg,
            axis: Vec3::Y,
        }
    }

    /// The dominant axis component picks the plane: Y -> XZ, Z -> XY, otherwise YZ.
    pub fn plane(&self) -> OrbitPlane {
        let a = self.axis.abs();
        if a.y >= a.x && a.y >= a.z {
            OrbitPlane::Xz
        } else if a.z >= a.x {
            OrbitPlane::Xy
        } else {
            OrbitPlane::Yz
        }
    }

    pub fn position_at(&self, elapsed: f32) -> Vec3 {
        let angle = (elapsed * self.speed_deg).to_radians();
        let angle = if angle.is_finite() { angle % TAU } else { 0.0 };
        let (sin, cos) = angle.sin_cos();
        let (a, b) = (self.radius * cos, self.radius * sin);
        let c = self.center;
        match self.plane() {
            OrbitPlane::Xz => vec3(c.x + a, c.y, c.z + b),
            OrbitPlane::Xy => vec3(c.x + a, c.y + b, c.z),
            OrbitPlane::Yz => vec3(c.x, c.y + a, c.z + b),
        }
    }
}

/// How an evaluated pose changes a model's Euler rotation (degrees).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Orientation {
    /// Cosmetic spin: sets pitch (x) and yaw (y), keeps roll.
    Spin { pitch_deg: f32, yaw_deg: f32 },
    /// Ground-vehicle heading: lays the model flat (x = -90) and faces `yaw_deg`.
    Heading { yaw_deg: f32 },
}

impl Orientation {
    /// Spin superimposed on free-flying animations; `index` desynchronizes models.
    pub fn spin(elapsed: f32, index: usize) -> Self {
        let i = index as f32;
        Orientation::Spin {
            pitch_deg: (elapsed * 2.0 + i).sin() * 15.0,
            yaw_deg: (elapsed * (30.0 + i * 15.0)) % 360.0,
        }
    }

    pub fn apply(self, rotation_deg: &mut Vec3) {
        match self {
            Orientation::Spin { pitch_deg, yaw_deg } => {
                rotation_deg.x = pitch_deg;
                rotation_deg.y = yaw_deg;
            }
            Orientation::Heading { yaw_deg } => {
                *rotation_deg = vec3(-90.0, yaw_deg, 0.0);
            }
        }
    }
}

/// Result of evaluating an animation at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Orientation,
}

/// Animation kinds understood by the scene file.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Animation {
    #[default]
    None,
    Bezier(BezierCurve),
    Track(BezierTrack),
    Orbit(Orbit),
    /// Recognized tag with no motion attached.
    Linear,
}

impl Animation {
    pub fn is_animated(&self) -> bool {
        matches!(
            self,
            Animation::Bezier(_) | Animation::Track(_) | Animation::Orbit(_)
        )
    }

    /// `index` is the model's position in the scene and only affects the spin.
    pub fn evaluate(&self, elapsed: f32, index: usize) -> Option<Pose> {
        match self {
            Animation::None | Animation::Linear => None,
            Animation::Bezier(curve) => Some(evaluate_bezier(curve, elapsed, index)),
            Animation::Track(track) => Some(evaluate_track(track, elapsed)),
            Animation::Orbit(orbit) => Some(evaluate_orbit(orbit, elapsed, index)),
        }
    }
}

pub fn evaluate_bezier(curve: &BezierCurve, elapsed: f32, index: usize) -> Pose {
    Pose {
        position: curve.position_at(elapsed),
        orientation: Orientation::spin(elapsed, index),
    }
}

pub fn evaluate_track(track: &BezierTrack, elapsed: f32) -> Pose {
    let sample = track.sample(elapsed);
    let mut position = sample.position;
    position.y = RIDE_HEIGHT;

    Pose {
        position,
        orientation: Orientation::Heading {
            yaw_deg: sample.direction.x.atan2(sample.direction.z).to_degrees(),
        },
    }
}

pub fn evaluate_orbit(orbit: &Orbit, elapsed: f32, index: usize) -> Pose {
    Pose {
        position: orbit.position_at(elapsed),
        orientation: Orientation::spin(elapsed, index),
    }
}

/// Animation bound to one scene object.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectAnimation {
    pub animation: Animation,
    /// Object position before any animation was applied.
    pub origin: Vec3,
}

impl ObjectAnimation {
    pub fn new(animation: Animation, origin: Vec3) -> Self {
        Self { animation, origin }
    }
}
