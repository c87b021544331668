use approx::assert_relative_eq;
use orbit_engine::{BodyId, BodyUpdate, Command, Engine, EngineConfig, NewBody, StateReport};
use ultraviolet::DVec2;

fn add(engine: &mut Engine, body: NewBody) -> BodyId {
    engine
        .apply(Command::Add(body))
        .expect("valid body")
        .expect("add returns an id")
}

fn center_of_mass_velocity(engine: &Engine) -> DVec2 {
    let total_mass: f64 = engine.bodies().iter().map(|b| b.mass).sum();
    let momentum = engine
        .bodies()
        .iter()
        .fold(DVec2::zero(), |p, b| p + b.momentum());
    momentum * (1.0 / total_mass)
}

fn distance(report: &StateReport, a: BodyId, b: BodyId) -> f64 {
    let a = report.get(a).unwrap();
    let b = report.get(b).unwrap();
    (b.x - a.x).hypot(b.y - a.y)
}

#[test]
fn two_body_center_of_mass_drifts_uniformly() {
    let mut engine = Engine::new();
    add(
        &mut engine,
        NewBody::at(-1e8, 0.0)
            .with_velocity(0.0, -200.0)
            .with_mass(6e24)
            .with_radius(6.4e6),
    );
    add(
        &mut engine,
        NewBody::at(1e8, 0.0)
            .with_velocity(5.0, 800.0)
            .with_mass(2e24)
            .with_radius(1.7e6),
    );

    let initial = center_of_mass_velocity(&engine);
    for _ in 0..2000 {
        let report = engine.tick(60.0);
        assert!(report.objects.iter().all(|o| !o.collided));
    }
    let after = center_of_mass_velocity(&engine);

    assert_relative_eq!(after.x, initial.x, epsilon = 1e-9);
    assert_relative_eq!(after.y, initial.y, epsilon = 1e-9);
}

#[test]
fn speed_never_exceeds_cap() {
    let cap = 1e4;
    let mut engine = Engine::with_config(EngineConfig {
        speed_cap: cap,
        ..EngineConfig::default()
    });
    // Already too fast, and about to fall hard into a massive neighbour.
    add(&mut engine, NewBody::at(0.0, 0.0).with_velocity(3e4, 4e4).with_mass(1.0));
    add(&mut engine, NewBody::at(1e6, 1e6).with_mass(1e30).with_radius(10.0));
    add(&mut engine, NewBody::at(1e6 + 5e3, 1e6).with_mass(5.0).with_radius(1.0));

    for _ in 0..50 {
        engine.tick(1.0);
        for body in engine.bodies() {
            assert!(body.speed() <= cap, "body {} at {}", body.id, body.speed());
        }
    }
}

#[test]
fn lighter_overlapping_body_is_reported_once_then_purged() {
    let mut engine = Engine::new();
    let heavy = add(&mut engine, NewBody::at(0.0, 0.0).with_mass(10.0).with_radius(5.0));
    let light = add(&mut engine, NewBody::at(3.0, 0.0).with_mass(1.0).with_radius(5.0));

    let first = engine.tick(1.0);
    assert!(first.get(light).unwrap().collided);
    assert!(!first.get(heavy).unwrap().collided);

    let second = engine.tick(1.0);
    assert!(second.get(light).is_none());
    let survivor = second.get(heavy).unwrap();
    assert_eq!((survivor.ax, survivor.ay), (0.0, 0.0));
}

#[test]
fn fast_bodies_do_not_tunnel() {
    let mut engine = Engine::new();
    // After the integration half of the tick they are 100 m apart and closing at
    // 200 m/s, so they cross mid-step and end up 100 m apart on opposite sides.
    let a = add(
        &mut engine,
        NewBody::at(-150.0, 0.0).with_velocity(100.0, 0.0).with_mass(2.0),
    );
    let b = add(
        &mut engine,
        NewBody::at(150.0, 0.0).with_velocity(-100.0, 0.0).with_mass(1.0),
    );

    let report = engine.tick(1.0);
    assert_relative_eq!(distance(&report, a, b), 100.0, epsilon = 1e-6);
    assert!(report.get(b).unwrap().collided);
    assert!(!report.get(a).unwrap().collided);
    assert!(engine.body(b).is_none());
}

#[test]
fn fast_bodies_do_not_tunnel_on_a_diagonal() {
    let mut engine = Engine::new();
    // 350 m apart on the diagonal, each moving 100 m/s toward the other. After the
    // integration half of the tick they are 150 m apart and meet 0.75 s later.
    let start = 175.0 * std::f64::consts::FRAC_1_SQRT_2;
    let speed = 100.0 * std::f64::consts::FRAC_1_SQRT_2;
    let a = add(
        &mut engine,
        NewBody::at(-start, -start)
            .with_velocity(speed, speed)
            .with_mass(2.0),
    );
    let b = add(
        &mut engine,
        NewBody::at(start, start)
            .with_velocity(-speed, -speed)
            .with_mass(1.0),
    );

    let report = engine.tick(1.0);
    assert_relative_eq!(distance(&report, a, b), 150.0, epsilon = 1e-6);
    assert!(report.get(b).unwrap().collided);
    assert!(!report.get(a).unwrap().collided);
    assert!(engine.body(b).is_none());
}

#[test]
fn removed_id_is_not_reused_by_the_host() {
    let mut engine = Engine::new();
    let id = add(&mut engine, NewBody::at(0.0, 0.0));
    engine.apply(Command::Remove { id }).unwrap();

    let text = format!(r#"{{ "command": "add", "id": {}, "x": 0, "y": 0 }}"#, id.0);
    assert!(engine.submit_json(&text).is_err());
    assert!(engine.bodies().is_empty());
    assert_eq!(add(&mut engine, NewBody::at(0.0, 0.0)), BodyId(1));
}

#[test]
fn updating_with_own_state_changes_nothing() {
    let setup = || {
        let mut engine = Engine::new();
        add(
            &mut engine,
            NewBody::at(0.0, 0.0).with_mass(1e30).with_radius(1e6),
        );
        add(
            &mut engine,
            NewBody::at(1e11, 0.0)
                .with_velocity(0.0, 3e4)
                .with_mass(1e24)
                .with_radius(1e3),
        );
        engine
    };
    let mut plain = setup();
    let mut updated = setup();

    for _ in 0..10 {
        plain.tick(3600.0);
        updated.tick(3600.0);
    }
    let own = BodyUpdate::from_body(updated.body(BodyId(1)).unwrap());
    updated.apply(Command::Update(own)).unwrap();

    for _ in 0..100 {
        assert_eq!(plain.tick(3600.0), updated.tick(3600.0));
    }
}

#[test]
fn replays_are_bit_identical() {
    let commands = [
        r#"{ "command": "add", "x": 0, "y": 0, "mass": 1e30, "radius": 7e8 }"#,
        r#"{ "command": "add", "x": 1.5e11, "y": 0, "vy": 29780, "mass": 6e24, "radius": 6.4e6 }"#,
        r#"{ "command": "add", "x": 0, "y": -2.2e11, "vx": 24000, "mass": 6.4e23, "radius": 3.4e6 }"#,
        r#"{ "command": "setTimeScale", "timeScale": 2 }"#,
    ];
    let dts = [3600.0, 7200.0, 1800.0, 86400.0];

    let run = || {
        let mut engine = Engine::new();
        for command in commands {
            engine.submit_json(command).unwrap();
        }
        (0..400)
            .map(|i| engine.tick(dts[i % dts.len()]))
            .collect::<Vec<_>>()
    };

    assert_eq!(run(), run());
}

#[test]
fn parallel_forces_replay_serial_run() {
    let run = |parallel_forces: bool| {
        let config = EngineConfig {
            parallel_forces,
            ..EngineConfig::default()
        };
        let g = config.gravitational_constant;
        let mut engine = Engine::with_config(config);
        for command in orbit_engine::utils::orbiting_disc(24, g, 3) {
            engine.apply(command).unwrap();
        }
        (0..100).map(|_| engine.tick(3600.0)).collect::<Vec<_>>()
    };

    assert_eq!(run(false), run(true));
}

#[test]
fn planet_stays_in_a_bounded_orbit() {
    let mut engine = Engine::new();
    let star = add(
        &mut engine,
        NewBody::at(0.0, 0.0)
            .with_id(BodyId(0))
            .with_mass(1e30)
            .with_radius(1e6),
    );
    let planet = add(
        &mut engine,
        NewBody::at(1e11, 0.0)
            .with_id(BodyId(1))
            .with_velocity(0.0, 3e4)
            .with_mass(1e24)
            .with_radius(1e3),
    );

    let mut closest = f64::INFINITY;
    let mut farthest = 0.0f64;
    for _ in 0..1000 {
        let report = engine.tick(3600.0);
        assert!(report.objects.iter().all(|o| !o.collided));

        let d = distance(&report, star, planet);
        closest = closest.min(d);
        farthest = farthest.max(d);
    }

    // Starts at periapsis of an ellipse with apoapsis near 2.07e11 m.
    assert!(closest > 0.99e11, "closest approach {closest}");
    assert!(farthest < 2.1e11, "farthest distance {farthest}");
    assert!(farthest > closest);
}

#[test]
fn malformed_commands_leave_state_untouched() {
    let mut engine = Engine::new();
    add(&mut engine, NewBody::at(1.0, 1.0));
    let before = engine.bodies().to_vec();

    for text in [
        r#"{ "command": "launch" }"#,
        r#"{ "command": "add", "x": 0 }"#,
        r#"{ "command": "add", "x": 0, "y": 0, "mass": -1 }"#,
        r#"{ "command": "update", "id": 0, "x": "left", "y": 0 }"#,
        r#"{ "command": "setTimeScale", "timeScale": 0 }"#,
    ] {
        assert!(engine.submit_json(text).is_err(), "{text} was accepted");
    }

    assert_eq!(engine.bodies(), &before[..]);
    assert_eq!(engine.time_scale(), 1.0);
    // Ticking still works afterwards.
    assert_eq!(engine.tick(1.0).objects.len(), 1);
}

#[test]
fn removed_body_stops_attracting() {
    let mut engine = Engine::new();
    let a = add(&mut engine, NewBody::at(0.0, 0.0).with_mass(1e20));
    let b = add(&mut engine, NewBody::at(1e5, 0.0).with_mass(1e20));

    let report = engine.tick(1.0);
    assert!(report.get(a).unwrap().ax > 0.0);

    engine.apply(Command::Remove { id: b }).unwrap();
    let report = engine.tick(1.0);
    assert_eq!(report.objects.len(), 1);
    assert_eq!(report.get(a).unwrap().ax, 0.0);
}
