//! Messages exchanged between the engine and its host.
//!
//! Commands travel host → engine and are tagged by a `"command"` field:
//!
//! ```json
//! { "command": "add", "x": 1.0e11, "y": 0.0, "vy": 3.0e4, "mass": 1.0e24, "radius": 1.0e3 }
//! { "command": "update", "id": 1, "x": 0.0, "y": 0.0 }
//! { "command": "remove", "id": 1 }
//! { "command": "setTimeScale", "timeScale": 2.0 }
//! ```
//!
//! Reports travel engine → host once per tick. All quantities are SI units.

use crate::{
    body::{Body, BodyId},
    error::CommandError,
};

use serde::{Deserialize, Serialize};

/// A request from the host. Applied only between ticks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Command {
    Add(NewBody),
    Remove {
        id: BodyId,
    },
    Update(BodyUpdate),
    SetTimeScale {
        #[serde(rename = "timeScale")]
        time_scale: f64,
    },
}

fn one() -> f64 {
    1.0
}

/// Initial state of a body created by [`Command::Add`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewBody {
    /// Id chosen by the host. When absent the engine allocates one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BodyId>,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub vx: f64,
    #[serde(default)]
    pub vy: f64,
    #[serde(default)]
    pub ax: f64,
    #[serde(default)]
    pub ay: f64,
    #[serde(default = "one")]
    pub mass: f64,
    #[serde(default = "one")]
    pub radius: f64,
}

impl NewBody {
    /// A unit-mass, unit-radius body at rest at `(x, y)`.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            id: None,
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            ax: 0.0,
            ay: 0.0,
            mass: 1.0,
            radius: 1.0,
        }
    }

    pub fn with_id(mut self, id: BodyId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_velocity(mut self, vx: f64, vy: f64) -> Self {
        self.vx = vx;
        self.vy = vy;
        self
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    fn validate(&self) -> Result<(), CommandError> {
        check_finite(&[
            ("x", self.x),
            ("y", self.y),
            ("vx", self.vx),
            ("vy", self.vy),
            ("ax", self.ax),
            ("ay", self.ay),
            ("mass", self.mass),
            ("radius", self.radius),
        ])?;
        check_mass(self.mass)?;
        if self.radius < 0.0 {
            return Err(CommandError::NegativeRadius(self.radius));
        }
        Ok(())
    }
}

/// Full kinematic overwrite of an existing body, sent by [`Command::Update`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BodyUpdate {
    pub id: BodyId,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub vx: f64,
    #[serde(default)]
    pub vy: f64,
    #[serde(default)]
    pub ax: f64,
    #[serde(default)]
    pub ay: f64,
    /// New mass; the current mass is kept when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass: Option<f64>,
}

impl BodyUpdate {
    /// An update that rewrites `body` with its own current state.
    pub fn from_body(body: &Body) -> Self {
        Self {
            id: body.id,
            x: body.pos.x,
            y: body.pos.y,
            vx: body.vel.x,
            vy: body.vel.y,
            ax: body.acc.x,
            ay: body.acc.y,
            mass: Some(body.mass),
        }
    }

    fn validate(&self) -> Result<(), CommandError> {
        check_finite(&[
            ("x", self.x),
            ("y", self.y),
            ("vx", self.vx),
            ("vy", self.vy),
            ("ax", self.ax),
            ("ay", self.ay),
        ])?;
        if let Some(mass) = self.mass {
            check_finite(&[("mass", mass)])?;
            check_mass(mass)?;
        }
        Ok(())
    }
}

fn check_finite(fields: &[(&'static str, f64)]) -> Result<(), CommandError> {
    match fields.iter().find(|(_, value)| !value.is_finite()) {
        Some(&(field, value)) => Err(CommandError::NonFinite { field, value }),
        None => Ok(()),
    }
}

fn check_mass(mass: f64) -> Result<(), CommandError> {
    if mass > 0.0 {
        Ok(())
    } else {
        Err(CommandError::NonPositiveMass(mass))
    }
}

impl Command {
    /// Parses and validates a JSON command.
    pub fn from_json(text: &str) -> Result<Self, CommandError> {
        let command: Self = serde_json::from_str(text)?;
        command.validate()?;
        Ok(command)
    }

    /// Checks the payload's numeric fields. Does not look at engine state.
    pub fn validate(&self) -> Result<(), CommandError> {
        match self {
            Command::Add(new) => new.validate(),
            Command::Remove { .. } => Ok(()),
            Command::Update(update) => update.validate(),
            Command::SetTimeScale { time_scale } => {
                if time_scale.is_finite() && *time_scale > 0.0 {
                    Ok(())
                } else {
                    Err(CommandError::NonPositiveTimeScale(*time_scale))
                }
            }
        }
    }
}

/// Kinematic state of one body as seen by the host.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectState {
    pub id: BodyId,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub ax: f64,
    pub ay: f64,
    /// True in the single report emitted for the tick in which the body was removed.
    pub collided: bool,
}

impl From<&Body> for ObjectState {
    fn from(body: &Body) -> Self {
        Self {
            id: body.id,
            x: body.pos.x,
            y: body.pos.y,
            vx: body.vel.x,
            vy: body.vel.y,
            ax: body.acc.x,
            ay: body.acc.y,
            collided: body.collided,
        }
    }
}

/// Everything the host learns from one tick.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateReport {
    /// Physical `dt` used by the tick, in seconds.
    pub delta_time: f64,
    pub objects: Vec<ObjectState>,
}

impl StateReport {
    pub fn get(&self, id: BodyId) -> Option<&ObjectState> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
