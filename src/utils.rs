use crate::{
    body::BodyId,
    protocol::{Command, NewBody},
};

/// Mass of the central star placed by [`orbiting_disc`], in kilograms.
pub const CENTRAL_MASS: f64 = 1.989e30;
/// Radius of the central star, in meters.
pub const CENTRAL_RADIUS: f64 = 6.96e8;

/// Generates `add` commands for a star with `n - 1` planets on circular orbits.
/// - Creates the massive central body first, so it gets the lowest id.
/// - Places the other bodies at random angles and radii in a disc between
///   0.3 and 5 AU, with a uniform area distribution.
/// - Gives each planet the circular orbit speed `sqrt(G M / r)` around the star.
///
/// The same `seed` always yields the same commands.
pub fn orbiting_disc(n: usize, g: f64, seed: u64) -> Vec<Command> {
    const AU: f64 = 1.496e11;
    let mut rng = fastrand::Rng::with_seed(seed);
    let inner_radius = 0.3 * AU;
    let outer_radius = 5.0 * AU;

    let mut commands = Vec::with_capacity(n);
    if n == 0 {
        return commands;
    }

    commands.push(Command::Add(
        NewBody::at(0.0, 0.0)
            .with_id(BodyId(0))
            .with_mass(CENTRAL_MASS)
            .with_radius(CENTRAL_RADIUS),
    ));

    for i in 1..n {
        let angle = rng.f64() * std::f64::consts::TAU;
        let (sin, cos) = angle.sin_cos();

        let t = inner_radius / outer_radius;
        let r = outer_radius * (rng.f64() * (1.0 - t * t) + t * t).sqrt();

        // Perpendicular to the radius vector, counter-clockwise.
        let v = (g * CENTRAL_MASS / r).sqrt();
        let mass = 1e23 + rng.f64() * 1e25;
        let radius = 5e6 * (mass / 1e24).cbrt();

        commands.push(Command::Add(
            NewBody::at(cos * r, sin * r)
                .with_id(BodyId(i as u64))
                .with_velocity(-sin * v, cos * v)
                .with_mass(mass)
                .with_radius(radius),
        ));
    }

    commands
}
