// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The N-body kernel.  Every body pulls on every other body with
//! softened Newtonian gravity; each call to `step` advances the whole
//! system by one fixed time step and bounces anything that left the
//! canvas back inside it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use bodies::{Body, BodySampler, BodySet};
use error::{KernelError, Result};
use planes::ScreenPlane;

/// The gravitational constant, tuned for pixels rather than meters.
pub const G: f64 = 0.1;

/// Added to every squared distance so coincident bodies do not divide
/// by zero.
pub const SOFTENING: f64 = 1e-9;

/// Fraction of its speed a body keeps when it bounces off an edge.
pub const DAMPING: f64 = 0.9;

/// Default integration step.
pub const DEFAULT_TIME_STEP: f64 = 0.008;

/// The physical constants of a simulation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SimulationParams {
    /// Strength of gravity.
    pub gravity: f64,
    /// Softening term in the squared distance.
    pub softening: f64,
    /// Speed kept on bouncing off an edge.
    pub damping: f64,
    /// How far each `step` advances time.
    pub time_step: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        SimulationParams {
            gravity: G,
            softening: SOFTENING,
            damping: DAMPING,
            time_step: DEFAULT_TIME_STEP,
        }
    }
}

/// What the host needs to draw one body.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SnapshotEntry {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
    /// Drawing radius.
    pub radius: f64,
    /// The packed 0xRRGGBBAA color, widened to a float.
    pub color: f64,
}

impl<'a> From<&'a Body> for SnapshotEntry {
    fn from(body: &'a Body) -> Self {
        SnapshotEntry {
            x: body.x,
            y: body.y,
            radius: body.radius,
            color: f64::from(body.color),
        }
    }
}

/// Owns the bodies, the canvas bounds and the random source used to
/// populate them.
pub struct NBodyEngine {
    params: SimulationParams,
    screen: Option<ScreenPlane>,
    bodies: BodySet,
    forces: Vec<(f64, f64)>,
    rng: StdRng,
}

impl NBodyEngine {
    /// An engine that draws its initial bodies from system entropy.
    pub fn new() -> Self {
        NBodyEngine::with_rng(StdRng::from_entropy())
    }

    /// An engine whose every `init` is reproducible from `seed`.
    pub fn seeded(seed: u64) -> Self {
        NBodyEngine::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        NBodyEngine {
            params: SimulationParams::default(),
            screen: None,
            bodies: BodySet::new(),
            forces: vec![],
            rng,
        }
    }

    /// Replaces the physical constants.
    pub fn with_params(mut self, params: SimulationParams) -> Self {
        self.params = params;
        self
    }

    /// Scatters `body_count` random bodies over a `width` by `height`
    /// canvas.  Counts above `MAX_BODIES` are clamped, not rejected;
    /// the return value is the number of bodies actually created.
    pub fn init(&mut self, width: usize, height: usize, body_count: usize) -> Result<usize> {
        let screen = ScreenPlane::new(width, height)?;
        let bodies = sample_bodies(screen, body_count, &mut self.rng);
        Ok(self.install(screen, bodies))
    }

    /// As `init`, drawing from a caller-supplied random source.
    pub fn init_with_rng<R: Rng + ?Sized>(
        &mut self,
        width: usize,
        height: usize,
        body_count: usize,
        rng: &mut R,
    ) -> Result<usize> {
        let screen = ScreenPlane::new(width, height)?;
        let bodies = sample_bodies(screen, body_count, rng);
        Ok(self.install(screen, bodies))
    }

    /// Starts from an explicit set of bodies instead of random ones.
    /// Masses below 1.0 are raised to 1.0 and every radius is derived
    /// again from its mass.
    pub fn init_with_bodies(
        &mut self,
        width: usize,
        height: usize,
        bodies: Vec<Body>,
    ) -> Result<usize> {
        let screen = ScreenPlane::new(width, height)?;
        let count = BodySet::clamp_count(bodies.len());
        let bodies = bodies
            .into_iter()
            .take(count)
            .map(|b| Body::new(b.x, b.y, b.vx, b.vy, b.mass, b.color))
            .collect();
        Ok(self.install(screen, bodies))
    }

    fn install(&mut self, screen: ScreenPlane, bodies: Vec<Body>) -> usize {
        let count = self.bodies.replace(bodies);
        self.forces = Vec::with_capacity(count);
        self.screen = Some(screen);
        info!(
            "n-body canvas {}x{} with {} bodies",
            screen.width(), screen.height(), count
        );
        count
    }

    /// Advances every body by one time step.  All forces are worked
    /// out from the positions as they stood before the step; then all
    /// velocities move, then all positions, then edges are enforced.
    pub fn step(&mut self) -> Result<()> {
        let screen = self.screen.ok_or(KernelError::Uninitialized("step"))?;
        let params = self.params;
        let dt = params.time_step;

        accumulate_forces(self.bodies.as_slice(), &params, &mut self.forces);

        let bodies = self.bodies.as_mut_slice();
        for (body, &(fx, fy)) in bodies.iter_mut().zip(self.forces.iter()) {
            body.vx += fx / body.mass * dt;
            body.vy += fy / body.mass * dt;
        }

        let (width, height) = (screen.width() as f64, screen.height() as f64);
        for body in bodies.iter_mut() {
            body.x += body.vx * dt;
            body.y += body.vy * dt;
            reflect(&mut body.x, &mut body.vx, width, params.damping);
            reflect(&mut body.y, &mut body.vy, height, params.damping);
        }
        Ok(())
    }

    /// One entry per active body, built fresh from the current state.
    pub fn export_snapshot(&self) -> Result<Vec<SnapshotEntry>> {
        self.active("export_snapshot")?;
        Ok(self.bodies.as_slice().iter().map(SnapshotEntry::from).collect())
    }

    /// The snapshot flattened to `[x, y, radius, color]` per body.
    pub fn export_flat(&self) -> Result<Vec<f64>> {
        let snapshot = self.export_snapshot()?;
        let mut flat = Vec::with_capacity(snapshot.len() * 4);
        for entry in snapshot {
            flat.extend_from_slice(&[entry.x, entry.y, entry.radius, entry.color]);
        }
        Ok(flat)
    }

    /// The active bodies, read-only.
    pub fn bodies(&self) -> &[Body] {
        self.bodies.as_slice()
    }

    /// Number of active bodies.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Changes the integration step.  Zero or negative steps are
    /// allowed but almost certainly a mistake.  A step that is not a
    /// finite number is refused and the current one kept.
    pub fn set_time_step(&mut self, time_step: f64) {
        if !time_step.is_finite() {
            warn!(
                "time step {} is not finite; keeping {}",
                time_step, self.params.time_step
            );
            return;
        }
        if time_step <= 0.0 {
            warn!("time step {} is not positive", time_step);
        }
        self.params.time_step = time_step;
    }

    /// The integration step.
    pub fn time_step(&self) -> f64 {
        self.params.time_step
    }

    /// The physical constants in use.
    pub fn params(&self) -> SimulationParams {
        self.params
    }

    /// The canvas size, once initialized.
    pub fn bounds(&self) -> Option<(usize, usize)> {
        self.screen.map(|s| (s.width(), s.height()))
    }

    fn active(&self, op: &'static str) -> Result<ScreenPlane> {
        self.screen.ok_or(KernelError::Uninitialized(op))
    }
}

impl Default for NBodyEngine {
    fn default() -> Self {
        NBodyEngine::new()
    }
}

fn sample_bodies<R: Rng + ?Sized>(screen: ScreenPlane, requested: usize, rng: &mut R) -> Vec<Body> {
    let count = BodySet::clamp_count(requested);
    let sampler = BodySampler::new(screen);
    (0..count).map(|_| sampler.sample(rng)).collect()
}

/// The all-pairs pass.  `forces[i]` ends up holding the net pull on
/// body `i`; nothing here writes to a body.
fn accumulate_forces(bodies: &[Body], params: &SimulationParams, forces: &mut Vec<(f64, f64)>) {
    forces.clear();
    forces.extend(bodies.iter().enumerate().map(|(i, a)| {
        bodies
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .fold((0.0, 0.0), |(fx, fy), (_, b)| {
                let dx = b.x - a.x;
                let dy = b.y - a.y;
                let dist_sq = dx * dx + dy * dy + params.softening;
                let dist = dist_sq.sqrt();
                let f = params.gravity * a.mass * b.mass / dist_sq;
                (fx + f * dx / dist, fy + f * dy / dist)
            })
    }));
}

/// Bounces one axis off the walls at 0 and `bound`.  A position that
/// is no longer a number is parked on the near wall, at rest.
fn reflect(position: &mut f64, velocity: &mut f64, bound: f64, damping: f64) {
    if position.is_nan() {
        *position = 0.0;
        *velocity = 0.0;
    } else if *position < 0.0 || *position > bound {
        *velocity *= -damping;
        *position = if *position < 0.0 { 0.0 } else { bound };
    }
}
