//! Breaks a frame up into horizontal bands of rows so that each band
//! can be rendered on its own thread.  A pixel depends only on its
//! own coordinates, the viewport and the palette, so bands never need
//! to see each other.

use std::ops::Range;

use fractal::FrameShader;

/// A half-open range of rows, `start..end`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RowRegion {
    /// The first row in the band.
    pub start: usize,
    /// One past the last row in the band.
    pub end: usize,
}

impl RowRegion {
    /// The rows covered, as a range.
    pub fn rows(&self) -> Range<usize> {
        self.start..self.end
    }

    /// How many rows the band covers.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True for a band with no rows in it.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// How many rows go into each band when `height` rows are shared out
/// between `parts` workers.  Every band but the last is this tall.
pub fn band_height(height: usize, parts: usize) -> usize {
    let parts = parts.max(1).min(height.max(1));
    let rounded_up = if height % parts == 0 { 0 } else { 1 };
    (height / parts + rounded_up).max(1)
}

/// Splits `0..height` into at most `parts` contiguous, non-overlapping
/// bands that together cover every row exactly once.
pub fn partition(height: usize, parts: usize) -> Vec<RowRegion> {
    let band = band_height(height, parts);
    (0..height)
        .step_by(band)
        .map(|start| RowRegion {
            start,
            end: (start + band).min(height),
        })
        .collect()
}

/// One band of a frame, ready to render.  The task owns the output
/// bytes of its own rows and only reads the shared render state, so
/// tasks can run in any order, on any thread.  While any task is
/// alive the engine that handed it out stays borrowed, which keeps
/// the viewport and palette frozen until the last band is done.
pub struct RegionTask<'a> {
    shader: FrameShader<'a>,
    region: RowRegion,
    rows: &'a mut [u8],
}

impl<'a> RegionTask<'a> {
    /// The rows this task writes.
    pub fn region(&self) -> RowRegion {
        self.region
    }

    /// Computes every pixel of the band into its slice of the buffer.
    pub fn run(self) {
        self.shader.fill_rows(self.region, self.rows);
    }
}

/// Cuts `buffer`, a whole RGBA frame, into one task per band.
pub fn region_tasks<'a>(
    shader: FrameShader<'a>,
    buffer: &'a mut [u8],
    parts: usize,
) -> Vec<RegionTask<'a>> {
    let screen = shader.screen();
    let stride = screen.width() * 4;
    let band = band_height(screen.height(), parts);
    partition(screen.height(), parts)
        .into_iter()
        .zip(buffer.chunks_mut(band * stride))
        .map(|(region, rows)| RegionTask {
            shader,
            region,
            rows,
        })
        .collect()
}
