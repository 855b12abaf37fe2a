#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Frame kernels
//!
//! Two small engines a visualizer can call once per animation frame.
//!
//! The `FractalEngine` renders the Mandelbrot set.  Every pixel is
//! mapped to a point on the complex plane, and that point is squared
//! and shifted over and over until it either flies off towards
//! infinity or runs out of budget.  How quickly it flies off picks
//! its color; points that never leave are painted black.  The engine
//! keeps its own viewport, so panning and zooming are just calls
//! between frames, and a frame can be split into bands of rows and
//! rendered on as many threads as the host likes.
//!
//! The `NBodyEngine` is a toy solar system on a canvas.  Every body
//! attracts every other body, the whole system advances one fixed
//! time step per frame, and anything that reaches the edge of the
//! canvas bounces back in, a little slower than it arrived.
//!
//! Neither engine knows about the other, and neither keeps any
//! process-wide state.

extern crate crossbeam;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate itertools;
#[macro_use]
extern crate log;
extern crate num;
extern crate rand;

pub mod bodies;
pub mod error;
pub mod escape;
pub mod fractal;
pub mod nbody;
pub mod palette;
pub mod planes;
pub mod regions;

pub use bodies::{Body, MAX_BODIES};
pub use error::{KernelError, Result};
pub use escape::MAX_ITERATIONS;
pub use fractal::FractalEngine;
pub use nbody::{NBodyEngine, SimulationParams, SnapshotEntry};
pub use regions::{RegionTask, RowRegion};
