//! Continuous collision detection and the removal policy.
//!
//! Every unordered pair of live bodies is tested once per tick. A pair that
//! already overlaps collides immediately. Otherwise, if the pair is close enough
//! that it could meet within `dt`, its relative position is sampled at evenly
//! spaced points inside the step so that fast bodies cannot pass through each
//! other between ticks.
//!
//! When a pair collides, exactly one side is removed: the lighter body, or the
//! later-created one if the masses are equal. The central body (the most
//! massive one) is never removed.

use crate::body::{Body, BodyId};

use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Ids of bodies to purge at the end of a tick, in ascending order.
pub type Removals = BTreeSet<BodyId>;

#[derive(Clone, Copy, Debug)]
pub struct CollisionDetector {
    /// Number of samples taken inside one step.
    pub substeps: u32,
    /// Whether the most massive body is exempt from removal.
    pub protect_central: bool,
}

impl Default for CollisionDetector {
    fn default() -> Self {
        Self::new(20)
    }
}

impl CollisionDetector {
    pub fn new(substeps: u32) -> Self {
        Self {
            substeps: substeps.max(1),
            protect_central: true,
        }
    }

    /// Finds every colliding pair among the live `bodies` over the next `dt` and
    /// decides which side of each pair is removed.
    ///
    /// Reads `bodies` only; marking and purging is left to the caller so that every
    /// pair is judged against the same state.
    pub fn detect(&self, bodies: &[Body], dt: f64) -> Removals {
        let central = if self.protect_central {
            central_body(bodies)
        } else {
            None
        };

        let live: Vec<&Body> = bodies.iter().filter(|b| !b.collided).collect();
        let mut removals = Removals::new();

        for (i, a) in live.iter().enumerate() {
            for b in &live[i + 1..] {
                if self.collides(a, b, dt) {
                    let loser = loser(a, b, central);
                    log::debug!("collision between {} and {}, removing {loser}", a.id, b.id);
                    removals.insert(loser);
                }
            }
        }

        removals
    }

    /// Whether `a` and `b` touch now or at any sampled point within the next `dt`.
    pub fn collides(&self, a: &Body, b: &Body, dt: f64) -> bool {
        let radius_sum = a.radius + b.radius;
        let contact_sq = radius_sum * radius_sum;
        let dist_sq = (b.pos - a.pos).mag_sq();

        if dist_sq < contact_sq {
            return true;
        }

        // Neither body can cover more than this much ground before the step ends.
        let reach = (max_speed(a, dt) + max_speed(b, dt)) * dt;
        let bound = radius_sum + reach;
        if dist_sq >= bound * bound {
            return false;
        }

        let n = self.substeps;
        (1..=n).any(|k| {
            let t = dt * f64::from(k) / f64::from(n);
            (b.position_at(t) - a.position_at(t)).mag_sq() < contact_sq
        })
    }
}

/// Upper bound on the speed of `body` over the next `dt`. Under constant
/// acceleration speed is convex in time, so the endpoints bound it.
fn max_speed(body: &Body, dt: f64) -> f64 {
    body.speed().max(body.velocity_at(dt).mag())
}

/// The body that is never removed: the most massive live body, the earliest
/// created one among equals.
pub fn central_body(bodies: &[Body]) -> Option<BodyId> {
    bodies
        .iter()
        .filter(|b| !b.collided)
        .min_by(|a, b| b.mass.total_cmp(&a.mass).then(a.id.cmp(&b.id)))
        .map(|b| b.id)
}

/// Which of two colliding bodies is removed.
pub fn loser(a: &Body, b: &Body, central: Option<BodyId>) -> BodyId {
    if central == Some(a.id) {
        return b.id;
    }
    if central == Some(b.id) {
        return a.id;
    }
    match a.mass.total_cmp(&b.mass) {
        Ordering::Less => a.id,
        Ordering::Greater => b.id,
        Ordering::Equal => a.id.max(b.id),
    }
}
