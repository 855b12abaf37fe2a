// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The Mandelbrot kernel.  The host calls `init` whenever the canvas
//! changes size, steers the viewport, and asks for a frame; the frame
//! lands in an RGBA buffer the host can blit directly.

use crossbeam;
use num::Complex;

use error::{KernelError, Result};
use escape::{escape_time, smooth_value, Escape, MAX_ITERATIONS};
use palette::Palette;
use planes::{Pixel, PlaneMapper, ScreenPlane, Viewport};
use regions::{self, RegionTask, RowRegion};

const INTERIOR: [u8; 4] = [0, 0, 0, 255];

/// Everything a pixel needs to know to color itself, borrowed from
/// the engine for the duration of one render.
#[derive(Copy, Clone)]
pub struct FrameShader<'a> {
    mapper: PlaneMapper,
    palette: &'a Palette,
    limit: usize,
}

impl<'a> FrameShader<'a> {
    fn new(
        screen: ScreenPlane,
        viewport: &Viewport,
        palette: &'a Palette,
        limit: usize,
    ) -> FrameShader<'a> {
        FrameShader {
            mapper: PlaneMapper::new(screen, viewport),
            palette,
            limit,
        }
    }

    /// The screen this shader renders for.
    pub fn screen(&self) -> ScreenPlane {
        self.mapper.screen
    }

    /// The RGBA value of one pixel.  Points that never escape are
    /// opaque black.
    pub fn shade(&self, pixel: &Pixel) -> [u8; 4] {
        match escape_time(self.mapper.pixel_to_point(pixel), self.limit) {
            Escape::Interior => INTERIOR,
            Escape::Escaped { iterations, z } => self.palette.shade(smooth_value(iterations, z)),
        }
    }

    /// Renders the rows of `region` into `rows`, which holds exactly
    /// those rows of the frame and nothing else.
    pub fn fill_rows(&self, region: RowRegion, rows: &mut [u8]) {
        let width = self.mapper.screen.width();
        let pixels = iproduct!(region.rows(), 0..width);
        for ((row, column), out) in pixels.zip(rows.chunks_mut(4)) {
            out.copy_from_slice(&self.shade(&Pixel(column, row)));
        }
    }
}

struct Canvas {
    screen: ScreenPlane,
    palette: Palette,
    buffer: Vec<u8>,
}

/// Holds the viewport, the palette and the frame buffer.  Nothing is
/// shared between engines, so several can run side by side.
pub struct FractalEngine {
    viewport: Viewport,
    limit: usize,
    canvas: Option<Canvas>,
}

impl FractalEngine {
    /// An engine with the default viewport and iteration cap.  It has
    /// no canvas until `init` is called.
    pub fn new() -> Self {
        FractalEngine::with_limit(MAX_ITERATIONS)
    }

    /// An engine that gives up on a point after `limit` iterations.
    pub fn with_limit(limit: usize) -> Self {
        FractalEngine {
            viewport: Viewport::default(),
            limit: limit.max(1),
            canvas: None,
        }
    }

    /// Sets up a `width` by `height` canvas: a fresh, zeroed RGBA
    /// buffer and a rebuilt palette.  The viewport carries over.
    pub fn init(&mut self, width: usize, height: usize) -> Result<()> {
        let screen = ScreenPlane::new(width, height)?;
        debug!("fractal canvas {}x{}", width, height);
        self.canvas = Some(Canvas {
            screen,
            palette: Palette::new(),
            buffer: vec![0u8; screen.len() * 4],
        });
        Ok(())
    }

    /// Replaces the viewport outright.
    pub fn set_view(&mut self, x: f64, y: f64, zoom: f64) -> Result<()> {
        self.viewport = Viewport::new(Complex::new(x, y), zoom)?;
        Ok(())
    }

    /// Pans by a distance measured in screen pixels.
    pub fn move_view(&mut self, dx: f64, dy: f64) -> Result<()> {
        let screen = self.screen("move_view")?;
        self.viewport.pan(&screen, dx, dy);
        Ok(())
    }

    /// Zooms by `factor`, keeping the point under the screen position
    /// (`focus_x`, `focus_y`) where it is.
    pub fn zoom_view(&mut self, factor: f64, focus_x: f64, focus_y: f64) -> Result<()> {
        let screen = self.screen("zoom_view")?;
        self.viewport.zoom_at(&screen, factor, focus_x, focus_y)
    }

    /// Renders every pixel of the canvas.
    pub fn render_full(&mut self) -> Result<()> {
        let height = self.screen("render_full")?.height();
        self.render_region(0, height)
    }

    /// Renders rows `start_row..end_row`, with the end clipped to the
    /// bottom of the canvas.  The rest of the buffer is left alone.
    pub fn render_region(&mut self, start_row: usize, end_row: usize) -> Result<()> {
        if start_row > end_row {
            return Err(KernelError::InvalidRegion {
                start: start_row,
                end: end_row,
            });
        }
        let (shader, buffer) = self.frame("render_region")?;
        let screen = shader.screen();
        let end = end_row.min(screen.height());
        let start = start_row.min(end);
        let stride = screen.width() * 4;
        shader.fill_rows(RowRegion { start, end }, &mut buffer[start * stride..end * stride]);
        Ok(())
    }

    /// Splits the frame into at most `parts` bands of rows, each an
    /// independent unit of work owning its own slice of the buffer.
    /// The engine cannot be touched again until every task is gone.
    pub fn region_tasks(&mut self, parts: usize) -> Result<Vec<RegionTask>> {
        let (shader, buffer) = self.frame("region_tasks")?;
        Ok(regions::region_tasks(shader, buffer, parts))
    }

    /// Renders the whole frame with one scoped thread per band.  The
    /// result is byte-for-byte what `render_full` produces.
    pub fn render_parallel(&mut self, threads: usize) -> Result<()> {
        let tasks = self.region_tasks(threads)?;
        debug!("rendering {} bands in parallel", tasks.len());
        crossbeam::scope(|spawner| {
            for task in tasks {
                spawner.spawn(move |_| task.run());
            }
        })
        .map_err(|_| KernelError::WorkerPanicked)
    }

    /// The RGBA frame, row-major from the top-left.  The view lasts
    /// until the next call that mutates the engine.
    pub fn output_buffer(&self) -> Result<&[u8]> {
        match self.canvas {
            Some(ref canvas) => Ok(&canvas.buffer),
            None => Err(KernelError::Uninitialized("output_buffer")),
        }
    }

    /// The plane point shown at pixel (`px`, `py`) under the current
    /// viewport.
    pub fn point_at(&self, px: usize, py: usize) -> Result<Complex<f64>> {
        let screen = self.screen("point_at")?;
        Ok(PlaneMapper::new(screen, &self.viewport).pixel_to_point(&Pixel(px, py)))
    }

    /// The raw escape result for pixel (`px`, `py`), without coloring.
    pub fn escape_at(&self, px: usize, py: usize) -> Result<Escape> {
        Ok(escape_time(self.point_at(px, py)?, self.limit))
    }

    /// Real part of the viewport center.
    pub fn center_x(&self) -> f64 {
        self.viewport.center().re
    }

    /// Imaginary part of the viewport center.
    pub fn center_y(&self) -> f64 {
        self.viewport.center().im
    }

    /// The current zoom level.
    pub fn zoom(&self) -> f64 {
        self.viewport.zoom()
    }

    /// The whole viewport.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The iteration cap.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// The palette built by the last `init`.
    pub fn palette(&self) -> Option<&Palette> {
        self.canvas.as_ref().map(|c| &c.palette)
    }

    /// Canvas width, or 0 before `init`.
    pub fn width(&self) -> usize {
        self.canvas.as_ref().map_or(0, |c| c.screen.width())
    }

    /// Canvas height, or 0 before `init`.
    pub fn height(&self) -> usize {
        self.canvas.as_ref().map_or(0, |c| c.screen.height())
    }

    fn screen(&self, op: &'static str) -> Result<ScreenPlane> {
        self.canvas
            .as_ref()
            .map(|c| c.screen)
            .ok_or(KernelError::Uninitialized(op))
    }

    fn frame(&mut self, op: &'static str) -> Result<(FrameShader, &mut [u8])> {
        let viewport = &self.viewport;
        let limit = self.limit;
        match self.canvas {
            Some(ref mut canvas) => {
                let shader = FrameShader::new(canvas.screen, viewport, &canvas.palette, limit);
                Ok((shader, &mut canvas.buffer[..]))
            }
            None => Err(KernelError::Uninitialized(op)),
        }
    }
}

impl Default for FractalEngine {
    fn default() -> Self {
        FractalEngine::new()
    }
}
