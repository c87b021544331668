use crate::{
    body::{Body, BodyId, IdAllocator},
    clock::{SimulationClock, sanitize_dt},
    collision::{CollisionDetector, Removals},
    config::EngineConfig,
    error::CommandError,
    force::ForceField,
    integrator::Integrator,
    protocol::{BodyUpdate, Command, NewBody, ObjectState, StateReport},
};

use ultraviolet::DVec2;

use std::time::Duration;

/// Owns the simulated bodies and advances them one tick at a time.
///
/// Commands are applied through `&mut self`, so they can never interleave with a
/// tick in progress.
#[derive(Debug)]
pub struct Engine {
    /// Tunable parameters the engine was built with.
    pub config: EngineConfig,
    /// Number of ticks run so far.
    pub frame: usize,
    bodies: Vec<Body>,
    ids: IdAllocator,
    integrator: Integrator,
    detector: CollisionDetector,
    clock: SimulationClock,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Creates an empty engine with default parameters.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Creates an empty engine. `config` is expected to have been validated.
    pub fn with_config(config: EngineConfig) -> Self {
        let mut integrator = Integrator::new(
            ForceField::new(config.gravitational_constant),
            config.speed_cap,
        );
        integrator.set_parallel(config.parallel_forces);

        let mut detector = CollisionDetector::new(config.collision_substeps);
        detector.protect_central = config.protect_central;

        let clock = SimulationClock::new(&config);

        Self {
            config,
            frame: 0,
            bodies: Vec::new(),
            ids: IdAllocator::new(),
            integrator,
            detector,
            clock,
        }
    }

    /// Currently active bodies.
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }

    pub fn time_scale(&self) -> f64 {
        self.clock.time_scale
    }

    /// Applies a parsed command. Invalid commands are rejected without touching
    /// any state. Returns the id of the created body for [`Command::Add`].
    pub fn apply(&mut self, command: Command) -> Result<Option<BodyId>, CommandError> {
        command.validate()?;

        match command {
            Command::Add(new) => self.add(new).map(Some),
            Command::Remove { id } => {
                self.remove(id);
                Ok(None)
            }
            Command::Update(update) => {
                self.update(update);
                Ok(None)
            }
            Command::SetTimeScale { time_scale } => {
                log::debug!("time scale {} -> {time_scale}", self.clock.time_scale);
                self.clock.time_scale = time_scale;
                Ok(None)
            }
        }
    }

    /// Parses and applies a JSON command. Rejected commands are logged and dropped.
    pub fn submit_json(&mut self, text: &str) -> Result<Option<BodyId>, CommandError> {
        let result = Command::from_json(text).and_then(|command| self.apply(command));
        if let Err(error) = &result {
            log::warn!("dropping command: {error}");
        }
        result
    }

    fn add(&mut self, new: NewBody) -> Result<BodyId, CommandError> {
        // Ids are never reused, even once the body that held one is gone.
        let id = match new.id {
            Some(id) => {
                self.ids.claim(id)?;
                id
            }
            None => self.ids.allocate().ok_or(CommandError::IdsExhausted)?,
        };

        let mut body = Body::new(
            id,
            DVec2::new(new.x, new.y),
            DVec2::new(new.vx, new.vy),
            new.mass,
            new.radius,
        );
        body.acc = DVec2::new(new.ax, new.ay);
        self.bodies.push(body);

        log::debug!("added body {id} (mass {}, radius {})", new.mass, new.radius);
        Ok(id)
    }

    fn remove(&mut self, id: BodyId) {
        let before = self.bodies.len();
        self.bodies.retain(|b| b.id != id);
        if self.bodies.len() == before {
            log::debug!("remove: no body {id}");
        }
    }

    fn update(&mut self, update: BodyUpdate) {
        let Some(body) = self.bodies.iter_mut().find(|b| b.id == update.id) else {
            log::debug!("update: no body {}", update.id);
            return;
        };

        body.pos = DVec2::new(update.x, update.y);
        body.vel = DVec2::new(update.vx, update.vy);
        body.acc = DVec2::new(update.ax, update.ay);
        if let Some(mass) = update.mass {
            body.mass = mass;
        }
    }

    /// Forgets the wall time of the last tick. Call this before switching to a
    /// clock with a different epoch.
    pub fn reset_clock(&mut self) {
        self.clock.reset();
    }

    /// Runs one tick whose `dt` is derived from the wall time `now`.
    pub fn tick_at(&mut self, now: Duration) -> StateReport {
        let dt = self.clock.next_dt(now);
        self.tick(dt)
    }

    /// Runs one tick of `dt` physical seconds:
    /// 1. integrates every body,
    /// 2. finds collisions against the integrated state,
    /// 3. marks the losers and reports every body,
    /// 4. purges the marked bodies.
    pub fn tick(&mut self, dt: f64) -> StateReport {
        let dt = sanitize_dt(dt, self.config.min_dt);

        self.integrator.step(&mut self.bodies, dt);

        let removals = self.detector.detect(&self.bodies, dt);
        self.mark(&removals);

        let report = StateReport {
            delta_time: dt,
            objects: self.bodies.iter().map(ObjectState::from).collect(),
        };

        self.bodies.retain(|b| !b.collided);
        self.frame += 1;

        log::trace!(
            "tick {} dt={dt} bodies={} removed={}",
            self.frame,
            self.bodies.len(),
            removals.len()
        );
        report
    }

    fn mark(&mut self, removals: &Removals) {
        if removals.is_empty() {
            return;
        }
        for body in &mut self.bodies {
            if removals.contains(&body.id) {
                body.collided = true;
            }
        }
    }
}
