// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The failures either kernel can report.  All of them are detected
//! before any state is touched, so an engine that returns an error is
//! exactly as it was before the call.

/// Everything that can go wrong at the boundary of a kernel.
#[derive(Debug, Fail, Clone, PartialEq)]
pub enum KernelError {
    /// A canvas needs at least one row and one column; the pixel to
    /// plane mapping divides by the height.
    #[fail(display = "invalid canvas dimensions {}x{}", width, height)]
    InvalidDimension {
        /// The rejected width.
        width: usize,
        /// The rejected height.
        height: usize,
    },

    /// Zoom levels and zoom factors must be positive and finite.
    #[fail(display = "zoom must be positive and finite, got {}", _0)]
    InvalidZoom(f64),

    /// A row range whose start lies after its end.
    #[fail(display = "row range {}..{} is inverted", start, end)]
    InvalidRegion {
        /// First row of the range.
        start: usize,
        /// One past the last row of the range.
        end: usize,
    },

    /// The named operation was called before `init`.
    #[fail(display = "{} called before init", _0)]
    Uninitialized(&'static str),

    /// One of the scoped render threads panicked.
    #[fail(display = "a render worker panicked")]
    WorkerPanicked,
}

/// Result alias used throughout the crate.
pub type Result<T> = ::std::result::Result<T, KernelError>;
