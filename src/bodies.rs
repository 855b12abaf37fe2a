//! Point masses, the bounded container that holds them, and the
//! random sampler that scatters a fresh population across a canvas.

use num;
use rand::distributions::{Distribution, Uniform};
use rand::Rng;

use planes::ScreenPlane;

/// The most bodies a simulation will ever hold.
pub const MAX_BODIES: usize = 10_000;

/// A point mass moving in the plane of the canvas.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Body {
    /// Horizontal position, in canvas pixels.
    pub x: f64,
    /// Vertical position, in canvas pixels.
    pub y: f64,
    /// Horizontal velocity.
    pub vx: f64,
    /// Vertical velocity.
    pub vy: f64,
    /// Never below 1.0.
    pub mass: f64,
    /// Drawing radius, derived from the mass.
    pub radius: f64,
    /// Packed as 0xRRGGBBAA.
    pub color: u32,
}

impl Body {
    /// A body at rest or in motion.  Masses below 1.0 are raised to
    /// 1.0, and the radius always follows from the mass.
    pub fn new(x: f64, y: f64, vx: f64, vy: f64, mass: f64, color: u32) -> Body {
        let mass = if mass >= 1.0 { mass } else { 1.0 };
        Body {
            x,
            y,
            vx,
            vy,
            mass,
            radius: radius_for(mass),
            color,
        }
    }
}

/// Bigger bodies are drawn bigger, but only by the square root.
pub fn radius_for(mass: f64) -> f64 {
    1.0 + mass.sqrt() * 0.5
}

/// Packs four channels into 0xRRGGBBAA.
pub fn pack_color(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (u32::from(r) << 24) | (u32::from(g) << 16) | (u32::from(b) << 8) | u32::from(a)
}

/// Splits 0xRRGGBBAA back into its channels.
pub fn unpack_color(color: u32) -> [u8; 4] {
    [
        (color >> 24) as u8,
        (color >> 16) as u8,
        (color >> 8) as u8,
        color as u8,
    ]
}

/// An ordered collection of at most `MAX_BODIES` bodies.  Asking for
/// more is not an error: the excess is dropped and a warning logged.
#[derive(Clone, Debug, Default)]
pub struct BodySet {
    bodies: Vec<Body>,
}

impl BodySet {
    /// An empty set.
    pub fn new() -> BodySet {
        BodySet { bodies: vec![] }
    }

    /// How many of `requested` bodies the set will actually keep.
    pub fn clamp_count(requested: usize) -> usize {
        let count = num::clamp(requested, 0, MAX_BODIES);
        if count < requested {
            warn!(
                "requested {} bodies, capacity is {}; clamping",
                requested, MAX_BODIES
            );
        }
        count
    }

    /// Throws away the current bodies and keeps the first
    /// `MAX_BODIES` of the new ones.  Returns how many were kept.
    pub fn replace<I>(&mut self, bodies: I) -> usize
    where
        I: IntoIterator<Item = Body>,
    {
        self.bodies.clear();
        self.bodies.extend(bodies.into_iter().take(MAX_BODIES));
        self.bodies.len()
    }

    /// The active bodies.
    pub fn as_slice(&self) -> &[Body] {
        &self.bodies
    }

    /// The active bodies, for in-place updates.
    pub fn as_mut_slice(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    /// Number of active bodies.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// True when no body is active.
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// The fixed upper bound on `len`.
    pub fn capacity(&self) -> usize {
        MAX_BODIES
    }
}

/// Draws random bodies for a canvas.  Positions are uniform over the
/// canvas; velocity components come in half-unit steps between -25
/// and 24.5; masses are whole numbers from 1 to 100; each color
/// channel sits between 55 and 254 so nothing vanishes against a
/// black background.
pub struct BodySampler {
    across: Uniform<f64>,
    down: Uniform<f64>,
}

impl BodySampler {
    /// A sampler covering `[0, width) x [0, height)`.
    pub fn new(screen: ScreenPlane) -> BodySampler {
        BodySampler {
            across: Uniform::new(0.0, screen.width() as f64),
            down: Uniform::new(0.0, screen.height() as f64),
        }
    }

    /// One random body.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Body {
        let x = self.across.sample(rng);
        let y = self.down.sample(rng);
        let vx = f64::from(rng.gen_range(0i32, 100i32) - 50) * 0.5;
        let vy = f64::from(rng.gen_range(0i32, 100i32) - 50) * 0.5;
        let mass = 1.0 + f64::from(rng.gen_range(0i32, 100i32));
        let color = pack_color(
            rng.gen_range(55u8, 255u8),
            rng.gen_range(55u8, 255u8),
            rng.gen_range(55u8, 255u8),
            0xFF,
        );
        Body::new(x, y, vx, vy, mass, color)
    }
}
