use crate::{body::Body, force::ForceField};

use rayon::prelude::*;
use ultraviolet::DVec2;

/// Velocity-Verlet (kick-drift-kick) integrator with a hard speed cap.
#[derive(Clone, Copy, Debug)]
pub struct Integrator {
    pub force_field: ForceField,
    /// Maximum speed any body may leave a step with.
    pub speed_cap: f64,
    /// Whether to evaluate forces with rayon.
    pub parallel: bool,
}

impl Integrator {
    pub fn new(force_field: ForceField, speed_cap: f64) -> Self {
        Self {
            force_field,
            speed_cap,
            parallel: false,
        }
    }

    /// Sets whether to use rayon for the force evaluations.
    pub fn set_parallel(&mut self, parallel: bool) {
        self.parallel = parallel;
    }

    /// Advances every live body by `dt`. Bodies marked collided are left untouched.
    ///
    /// Both force evaluations see one consistent snapshot of the system, so the
    /// result does not depend on body order.
    pub fn step(&self, bodies: &mut [Body], dt: f64) {
        if bodies.is_empty() {
            return;
        }
        let half_dt = 0.5 * dt;

        // a_n from x_n
        self.attract(bodies);

        // v_n+1/2 = v_n + a_n dt/2, x_n+1 = x_n + v_n+1/2 dt
        for body in bodies.iter_mut().filter(|b| !b.collided) {
            body.vel += body.acc * half_dt;
            body.pos += body.vel * dt;
        }

        // a_n+1 from x_n+1
        self.attract(bodies);

        // v_n+1 = v_n+1/2 + a_n+1 dt/2
        for body in bodies.iter_mut().filter(|b| !b.collided) {
            body.vel += body.acc * half_dt;
            body.vel = cap_speed(body.vel, self.speed_cap);
        }
    }

    /// Recomputes the acceleration of every live body from the current positions.
    pub fn attract(&self, bodies: &mut [Body]) {
        let snapshot = bodies.to_vec();
        let field = self.force_field;

        if self.parallel {
            bodies
                .par_iter_mut()
                .filter(|body| !body.collided)
                .for_each(|body| field.accumulate(body, &snapshot));
        } else {
            bodies
                .iter_mut()
                .filter(|body| !body.collided)
                .for_each(|body| field.accumulate(body, &snapshot));
        }
    }
}

/// Rescales `vel` so its magnitude does not exceed `cap`, keeping its direction.
///
/// The result satisfies `vel.mag() <= cap` exactly, not just up to rounding.
pub fn cap_speed(vel: DVec2, cap: f64) -> DVec2 {
    let speed = vel.mag();
    if speed <= cap {
        return vel;
    }

    let mut capped = vel * (cap / speed);
    while capped.mag() > cap {
        capped = capped * (1.0 - f64::EPSILON);
    }
    capped
}
