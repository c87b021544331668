pub mod body;
pub mod c_api;
pub mod clock;
pub mod collision;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod force;
pub mod integrator;
pub mod protocol;
pub mod utils;

pub use body::{Body, BodyId};
pub use clock::{ClockSource, ManualClock, SimulationClock, SystemClock};
pub use collision::CollisionDetector;
pub use config::EngineConfig;
pub use driver::Driver;
pub use engine::Engine;
pub use error::{CommandError, ConfigError, DriverError};
pub use force::ForceField;
pub use integrator::Integrator;
pub use protocol::{BodyUpdate, Command, NewBody, ObjectState, StateReport};
