use crate::error::CommandError;

use serde::{Deserialize, Serialize};
use ultraviolet::DVec2;

use std::fmt;

/// Stable identifier of a body, unique for the lifetime of an engine.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyId(pub u64);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out body ids in increasing order. Ids are never reused, even after
/// the body they named has been removed.
#[derive(Clone, Debug, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fresh id, or `None` once the id space is used up.
    pub fn allocate(&mut self) -> Option<BodyId> {
        let id = self.peek();
        self.next = self.next.checked_add(1)?;
        Some(id)
    }

    /// Takes an id chosen by the host. Later allocations skip past it.
    ///
    /// Fails for ids below [`IdAllocator::peek`] and for the last id in the space.
    pub fn claim(&mut self, id: BodyId) -> Result<(), CommandError> {
        if id < self.peek() {
            return Err(CommandError::DuplicateId(id));
        }
        self.next = id.0.checked_add(1).ok_or(CommandError::IdsExhausted)?;
        Ok(())
    }

    /// The id the next call to [`IdAllocator::allocate`] will return.
    pub fn peek(&self) -> BodyId {
        BodyId(self.next)
    }
}

/// A point mass with a finite radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    pub id: BodyId,
    /// Position in meters.
    pub pos: DVec2,
    /// Velocity in meters per second.
    pub vel: DVec2,
    /// Acceleration cached from the last force evaluation.
    pub acc: DVec2,
    /// Mass in kilograms, always positive.
    pub mass: f64,
    /// Radius in meters, used for collisions and the force clamp.
    pub radius: f64,
    /// Set when collision resolution has claimed this body for removal.
    pub collided: bool,
}

impl Body {
    /// A live body with id `id`. It starts with zero acceleration and is not
    /// marked collided.
    pub fn new(id: BodyId, pos: DVec2, vel: DVec2, mass: f64, radius: f64) -> Self {
        Self {
            id,
            pos,
            vel,
            acc: DVec2::zero(),
            mass,
            radius,
            collided: false,
        }
    }

    /// Second-order Taylor extrapolation of the position `dt` seconds ahead.
    pub fn position_at(&self, dt: f64) -> DVec2 {
        self.pos + self.vel * dt + self.acc * (0.5 * dt * dt)
    }

    /// Velocity `dt` seconds ahead under the current acceleration.
    pub fn velocity_at(&self, dt: f64) -> DVec2 {
        self.vel + self.acc * dt
    }

    pub fn speed(&self) -> f64 {
        self.vel.mag()
    }

    pub fn momentum(&self) -> DVec2 {
        self.vel * self.mass
    }
}
