//! Contains the relationship between the integral screen plane, with
//! its origin at the top-left pixel, and the window onto the complex
//! plane that the viewport describes.  Unlike a fixed pair of
//! corners, the window here is a center and a zoom level, so panning
//! and zooming only ever touch the viewport.
use num::Complex;

use error::{KernelError, Result};

/// At zoom 1.0 the full height of the screen spans this much of the
/// imaginary axis.
pub const VIEW_SPAN: f64 = 3.0;

/// Describes the width and height of the screen plane.  It starts at
/// 0,0 in the top-left corner.  The only way to get one is through
/// `ScreenPlane::new`, so both dimensions are non-zero and an RGBA
/// frame of this size is addressable.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScreenPlane(usize, usize);

/// The column and row of a pixel on the screen plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

impl ScreenPlane {
    /// Rejects empty planes before anything gets a chance to divide by
    /// the height, and planes whose RGBA buffer length would not fit
    /// in a `usize`.
    pub fn new(width: usize, height: usize) -> Result<ScreenPlane> {
        let bytes = width.checked_mul(height).and_then(|n| n.checked_mul(4));
        match bytes {
            Some(n) if n > 0 => Ok(ScreenPlane(width, height)),
            _ => Err(KernelError::InvalidDimension { width, height }),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.0
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.1
    }

    /// The total number of pixels.
    pub fn len(&self) -> usize {
        self.0 * self.1
    }

    /// Describes that the plane is of a size.
    pub fn is_empty(&self) -> bool {
        self.0 == 0 || self.1 == 0
    }

    /// Width over height.
    pub fn aspect_ratio(&self) -> f64 {
        self.0 as f64 / self.1 as f64
    }

    /// Rescales a screen position to normalized device coordinates,
    /// where both axes run from -1.0 to 1.0 across the screen.
    pub fn ndc(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x / self.0 as f64) * 2.0 - 1.0,
            (y / self.1 as f64) * 2.0 - 1.0,
        )
    }
}

/// Where on the complex plane we are looking, and how closely.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    center: Complex<f64>,
    zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            center: Complex::new(-0.7, 0.0),
            zoom: 1.0,
        }
    }
}

fn checked_zoom(zoom: f64) -> Result<f64> {
    if zoom.is_finite() && zoom > 0.0 {
        Ok(zoom)
    } else {
        Err(KernelError::InvalidZoom(zoom))
    }
}

impl Viewport {
    /// A viewport centered on `center`.  The zoom must be positive.
    pub fn new(center: Complex<f64>, zoom: f64) -> Result<Viewport> {
        let zoom = checked_zoom(zoom)?;
        Ok(Viewport { center, zoom })
    }

    /// The point of the complex plane at the middle of the screen.
    pub fn center(&self) -> Complex<f64> {
        self.center
    }

    /// The current magnification.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// The size of one screen pixel, in plane units, along the
    /// imaginary axis.
    pub fn scale(&self, screen: &ScreenPlane) -> f64 {
        VIEW_SPAN / (self.zoom * screen.1 as f64)
    }

    /// Shifts the center by a distance given in screen pixels.
    pub fn pan(&mut self, screen: &ScreenPlane, dx: f64, dy: f64) {
        let scale = self.scale(screen);
        self.center.re += dx * scale;
        self.center.im += dy * scale;
    }

    /// Multiplies the zoom by `factor`, moving the center so that the
    /// plane point under the screen position (`focus_x`, `focus_y`)
    /// is still under it afterwards.  The focus is located on the
    /// plane at the old scale first; only then is the zoom changed
    /// and the center solved back out of the new scale.
    pub fn zoom_at(
        &mut self,
        screen: &ScreenPlane,
        factor: f64,
        focus_x: f64,
        focus_y: f64,
    ) -> Result<()> {
        let factor = checked_zoom(factor)?;
        let zoom = checked_zoom(self.zoom * factor)?;

        let (ndc_x, ndc_y) = screen.ndc(focus_x, focus_y);
        let aspect = screen.aspect_ratio();
        let half_width = screen.0 as f64 / 2.0;
        let half_height = screen.1 as f64 / 2.0;

        let scale = self.scale(screen);
        let world_x = ndc_x * scale * aspect * half_width + self.center.re;
        let world_y = ndc_y * scale * half_height + self.center.im;

        self.zoom = zoom;

        let scale = self.scale(screen);
        self.center = Complex::new(
            world_x - ndc_x * scale * aspect * half_width,
            world_y - ndc_y * scale * half_height,
        );
        Ok(())
    }
}

/// A frozen pairing of a screen plane and a viewport, with the
/// per-frame factors worked out once so that mapping a pixel is only
/// a couple of multiply-adds.
#[derive(Copy, Clone, Debug)]
pub struct PlaneMapper {
    /// The screen plane being mapped from.
    pub screen: ScreenPlane,
    center: Complex<f64>,
    // Integer halves of the screen, so that pixel (w/2, h/2) lands
    // exactly on the center.
    half: (f64, f64),
    scale: f64,
    aspect: f64,
}

impl PlaneMapper {
    /// Captures the viewport as it is right now.
    pub fn new(screen: ScreenPlane, viewport: &Viewport) -> PlaneMapper {
        PlaneMapper {
            screen,
            center: viewport.center,
            half: ((screen.0 / 2) as f64, (screen.1 / 2) as f64),
            scale: viewport.scale(&screen),
            aspect: screen.aspect_ratio(),
        }
    }

    /// Given a pixel on the screen plane, map it to the point of the
    /// complex plane it shows.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        Complex::new(
            (pixel.0 as f64 - self.half.0) * self.scale * self.aspect + self.center.re,
            (pixel.1 as f64 - self.half.1) * self.scale + self.center.im,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn screen_plane_fails_on_empty_shape() {
        assert_eq!(
            ScreenPlane::new(0, 10),
            Err(KernelError::InvalidDimension {
                width: 0,
                height: 10
            })
        );
        assert!(ScreenPlane::new(10, 0).is_err());
        assert!(ScreenPlane::new(1, 1).is_ok());
    }

    #[test]
    fn screen_plane_fails_when_the_frame_cannot_be_addressed() {
        let huge = ::std::usize::MAX / 2;
        assert_eq!(
            ScreenPlane::new(huge, 3),
            Err(KernelError::InvalidDimension {
                width: huge,
                height: 3
            })
        );
        assert!(ScreenPlane::new(::std::usize::MAX / 4 + 1, 1).is_err());
        let fits = ScreenPlane::new(::std::usize::MAX / 8, 2).unwrap();
        assert_eq!(fits.len(), (::std::usize::MAX / 8) * 2);
    }

    #[test]
    fn viewport_rejects_bad_zoom() {
        assert!(Viewport::new(Complex::new(0.0, 0.0), 0.0).is_err());
        assert!(Viewport::new(Complex::new(0.0, 0.0), -2.0).is_err());
        assert!(Viewport::new(Complex::new(0.0, 0.0), ::std::f64::NAN).is_err());
        assert!(Viewport::new(Complex::new(0.0, 0.0), 0.5).is_ok());
    }

    #[test]
    fn center_pixel_maps_to_center() {
        let screen = ScreenPlane::new(100, 100).unwrap();
        let view = Viewport::new(Complex::new(-0.7, 0.0), 1.0).unwrap();
        let pm = PlaneMapper::new(screen, &view);
        assert_eq!(pm.pixel_to_point(&Pixel(50, 50)), Complex::new(-0.7, 0.0));
    }

    #[test]
    fn odd_screens_use_integer_halves() {
        let screen = ScreenPlane::new(101, 99).unwrap();
        let view = Viewport::new(Complex::new(0.25, -0.5), 2.0).unwrap();
        let pm = PlaneMapper::new(screen, &view);
        assert_eq!(pm.pixel_to_point(&Pixel(50, 49)), Complex::new(0.25, -0.5));
    }

    #[test]
    fn top_left_pixel_on_square_screen() {
        let screen = ScreenPlane::new(4, 4).unwrap();
        let view = Viewport::new(Complex::new(0.0, 0.0), 1.0).unwrap();
        let pm = PlaneMapper::new(screen, &view);
        let p = pm.pixel_to_point(&Pixel(0, 0));
        assert!(close(p.re, -1.5));
        assert!(close(p.im, -1.5));
    }

    #[test]
    fn pan_moves_in_screen_pixels() {
        let screen = ScreenPlane::new(200, 100).unwrap();
        let mut view = Viewport::new(Complex::new(0.0, 0.0), 2.0).unwrap();
        view.pan(&screen, 10.0, -20.0);
        assert!(close(view.center().re, 10.0 * 3.0 / 200.0));
        assert!(close(view.center().im, -20.0 * 3.0 / 200.0));
        assert_eq!(view.zoom(), 2.0);
    }

    #[test]
    fn zoom_keeps_focus_under_cursor() {
        let screen = ScreenPlane::new(120, 80).unwrap();
        let mut view = Viewport::new(Complex::new(-0.5, 0.1), 1.0).unwrap();
        let focus = Pixel(30, 70);
        let before = PlaneMapper::new(screen, &view).pixel_to_point(&focus);
        view.zoom_at(&screen, 4.0, 30.0, 70.0).unwrap();
        let after = PlaneMapper::new(screen, &view).pixel_to_point(&focus);
        assert_eq!(view.zoom(), 4.0);
        assert!(close(before.re, after.re));
        assert!(close(before.im, after.im));
    }

    #[test]
    fn zoom_at_screen_center_keeps_center() {
        let screen = ScreenPlane::new(100, 100).unwrap();
        let mut view = Viewport::default();
        view.zoom_at(&screen, 3.0, 50.0, 50.0).unwrap();
        assert!(close(view.center().re, -0.7));
        assert!(close(view.center().im, 0.0));
    }

    #[test]
    fn zoom_in_then_out_restores_view() {
        let screen = ScreenPlane::new(640, 480).unwrap();
        let original = Viewport::new(Complex::new(-0.74, 0.13), 7.5).unwrap();
        let mut view = original;
        view.zoom_at(&screen, 2.5, 12.0, 400.0).unwrap();
        view.zoom_at(&screen, 1.0 / 2.5, 12.0, 400.0).unwrap();
        assert!((view.zoom() - original.zoom()).abs() < 1e-9);
        assert!((view.center().re - original.center().re).abs() < 1e-9);
        assert!((view.center().im - original.center().im).abs() < 1e-9);
    }

    #[test]
    fn rejected_zoom_leaves_view_alone() {
        let screen = ScreenPlane::new(10, 10).unwrap();
        let mut view = Viewport::default();
        assert_eq!(
            view.zoom_at(&screen, 0.0, 1.0, 1.0),
            Err(KernelError::InvalidZoom(0.0))
        );
        assert_eq!(view, Viewport::default());
    }
}
