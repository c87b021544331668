use crate::body::Body;

use ultraviolet::DVec2;

/// Direct-summation Newtonian gravity.
#[derive(Clone, Copy, Debug)]
pub struct ForceField {
    /// Gravitational constant.
    pub g: f64,
}

impl ForceField {
    pub fn new(g: f64) -> Self {
        Self { g }
    }

    /// Replaces `body.acc` with the gravitational pull of every other live body in
    /// `others`. `others` may contain `body` itself; entries with the same id are
    /// skipped, as are bodies already marked collided.
    pub fn accumulate(&self, body: &mut Body, others: &[Body]) {
        body.acc = self.acceleration_on(body, others);
    }

    /// Acceleration `body` would feel from `others`, without touching either.
    pub fn acceleration_on(&self, body: &Body, others: &[Body]) -> DVec2 {
        let mut acc = DVec2::zero();

        for other in others {
            if other.id == body.id || other.collided {
                continue;
            }

            let d = other.pos - body.pos;
            let radius_sum = body.radius + other.radius;

            // Clamping to the contact distance keeps the force finite when bodies touch
            // or overlap.
            let dist_sq = d.mag_sq().max(radius_sum * radius_sum);
            if dist_sq == 0.0 {
                continue;
            }

            let force = self.g * body.mass * other.mass / dist_sq;
            acc += d * (force / body.mass / dist_sq.sqrt());
        }

        acc
    }
}
