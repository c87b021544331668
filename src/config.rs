use crate::error::ConfigError;

use serde::Deserialize;

use std::time::Duration;

/// Tunable parameters of an [`Engine`](crate::engine::Engine).
///
/// Every field has a default, so a JSON config only needs to name the values it
/// changes:
///
/// ```json
/// { "timeScale": 2.0, "collisionSubsteps": 40 }
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct EngineConfig {
    /// Gravitational constant in m³ kg⁻¹ s⁻².
    pub gravitational_constant: f64,
    /// Hard upper bound on body speed, in m/s.
    pub speed_cap: f64,
    /// Number of samples taken inside one `dt` by the continuous collision check.
    pub collision_substeps: u32,
    /// Wall-clock period of the driver loop, in milliseconds.
    pub tick_interval_ms: u64,
    /// Physical seconds simulated per wall-clock second at time scale 1.
    pub seconds_per_wall_second: f64,
    /// Smallest `dt` a tick will ever use, in physical seconds.
    pub min_dt: f64,
    /// Initial time-scale multiplier.
    pub time_scale: f64,
    /// Never remove the most massive body in a collision.
    pub protect_central: bool,
    /// Evaluate forces with rayon.
    pub parallel_forces: bool,
    /// Number of undelivered reports the driver buffers before dropping new ones.
    pub report_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gravitational_constant: Self::DEFAULT_G,
            speed_cap: Self::DEFAULT_SPEED_CAP,
            collision_substeps: Self::DEFAULT_SUBSTEPS,
            tick_interval_ms: Self::DEFAULT_TICK_INTERVAL_MS,
            seconds_per_wall_second: Self::DEFAULT_SECONDS_PER_WALL_SECOND,
            min_dt: Self::DEFAULT_MIN_DT,
            time_scale: 1.0,
            protect_central: true,
            parallel_forces: false,
            report_buffer: Self::DEFAULT_REPORT_BUFFER,
        }
    }
}

impl EngineConfig {
    /// Default constants.
    pub const DEFAULT_G: f64 = 6.674e-11;
    pub const DEFAULT_SPEED_CAP: f64 = 299_792_458.0;
    pub const DEFAULT_SUBSTEPS: u32 = 20;
    pub const DEFAULT_TICK_INTERVAL_MS: u64 = 16;
    /// One wall-clock second advances the simulation by one day.
    pub const DEFAULT_SECONDS_PER_WALL_SECOND: f64 = 86_400.0;
    pub const DEFAULT_MIN_DT: f64 = 1e-3;
    pub const DEFAULT_REPORT_BUFFER: usize = 64;

    /// Parses and validates a JSON config.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("gravitationalConstant", self.gravitational_constant),
            ("speedCap", self.speed_cap),
            ("secondsPerWallSecond", self.seconds_per_wall_second),
            ("minDt", self.min_dt),
            ("timeScale", self.time_scale),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }
        if self.collision_substeps == 0 {
            return Err(ConfigError::OutOfRange {
                field: "collisionSubsteps",
                value: 0.0,
            });
        }
        if self.report_buffer == 0 {
            return Err(ConfigError::OutOfRange {
                field: "reportBuffer",
                value: 0.0,
            });
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
