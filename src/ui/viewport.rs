//! Pan/zoom model: how image space maps onto the screen.
//!
//! The transform scales the image about its own center, moves that center to
//! the window center, then shifts it by the pan offset `(x, y)`. All lengths
//! are device pixels.

/// Smallest scale free zoom can reach.
pub const MIN_SCALE: f64 = 0.01;

/// Wheel lines per unit of scale.
pub const WHEEL_DIVISOR: f64 = 15.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoomPreset {
    Actual,
    Double,
    Fit,
    Quad,
}

impl ZoomPreset {
    /// Fixed scale for this preset; `None` for [`ZoomPreset::Fit`].
    pub fn scale(self) -> Option<f64> {
        match self {
            ZoomPreset::Actual => Some(1.0),
            ZoomPreset::Double => Some(2.0),
            ZoomPreset::Quad => Some(4.0),
            ZoomPreset::Fit => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub scale: f64,
    pub x: f64,
    pub y: f64,
}

impl Transform {
    /// Screen position of the image's top-left corner.
    pub fn origin(&self, image: (f64, f64), screen: (f64, f64)) -> (f64, f64) {
        (
            screen.0 / 2.0 + self.x - image.0 * self.scale / 2.0,
            screen.1 / 2.0 + self.y - image.1 * self.scale / 2.0,
        )
    }

    pub fn to_screen(&self, point: (f64, f64), image: (f64, f64), screen: (f64, f64)) -> (f64, f64) {
        let (ox, oy) = self.origin(image, screen);
        (ox + point.0 * self.scale, oy + point.1 * self.scale)
    }
}

/// Scale that shows all of `image` inside `bounds`. The binding axis is
/// picked by comparing aspect ratios.
pub fn fit_scale(bounds: (f64, f64), image: (f64, f64)) -> f64 {
    if bounds.0 <= 0.0 || bounds.1 <= 0.0 || image.0 <= 0.0 || image.1 <= 0.0 {
        return 1.0;
    }
    let window_aspect = bounds.0 / bounds.1;
    let image_aspect = image.0 / image.1;
    if window_aspect > image_aspect {
        bounds.1 / image.1
    } else {
        bounds.0 / image.0
    }
}

#[derive(Clone, Debug)]
pub struct Viewport {
    pub scale: f64,
    pub x: f64,
    pub y: f64,
    /// Refit when navigation brings in a new image.
    pub auto_size: bool,
    /// Pointer minus pan offset, captured on button press.
    grab: Option<(f64, f64)>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            x: 0.0,
            y: 0.0,
            auto_size: true,
            grab: None,
        }
    }
}

impl Viewport {
    pub fn transform(&self) -> Transform {
        Transform {
            scale: self.scale,
            x: self.x,
            y: self.y,
        }
    }

    pub fn fit(&mut self, bounds: (f64, f64), image: (f64, f64)) {
        self.scale = fit_scale(bounds, image).max(MIN_SCALE);
        self.reset_pan();
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale.max(MIN_SCALE);
        self.reset_pan();
    }

    /// Free zoom by wheel lines. Pan is left alone.
    pub fn zoom_by(&mut self, wheel: f64) {
        self.scale = (self.scale + wheel / WHEEL_DIVISOR).max(MIN_SCALE);
    }

    pub fn begin_drag(&mut self, pointer: (f64, f64)) {
        self.grab = Some((pointer.0 - self.x, pointer.1 - self.y));
    }

    pub fn drag_to(&mut self, pointer: (f64, f64)) {
        if let Some((gx, gy)) = self.grab {
            self.x = pointer.0 - gx;
            self.y = pointer.1 - gy;
        }
    }

    pub fn end_drag(&mut self) {
        self.grab = None;
    }

    pub fn grab(&self) -> Option<(f64, f64)> {
        self.grab
    }

    fn reset_pan(&mut self) {
        self.x = 0.0;
        self.y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_fit_same_aspect() {
        let mut vp = Viewport {
            x: 30.0,
            y: -12.0,
            ..Viewport::default()
        };
        vp.fit((1920.0, 1080.0), (3840.0, 2160.0));
        assert!(close(vp.scale, 0.5));
        assert_eq!((vp.x, vp.y), (0.0, 0.0));
    }

    #[test]
    fn test_fit_tall_image_binds_on_height() {
        assert!(close(fit_scale((1920.0, 1080.0), (1000.0, 2000.0)), 0.54));
    }

    #[test]
    fn test_fit_wide_image_binds_on_width() {
        assert!(close(fit_scale((1000.0, 1000.0), (4000.0, 1000.0)), 0.25));
    }

    #[test]
    fn test_fit_degenerate_sizes() {
        assert_eq!(fit_scale((0.0, 1080.0), (100.0, 100.0)), 1.0);
        assert_eq!(fit_scale((1920.0, 1080.0), (0.0, 0.0)), 1.0);
    }

    #[test]
    fn test_presets_reset_pan() {
        for preset in [ZoomPreset::Actual, ZoomPreset::Double, ZoomPreset::Quad] {
            let mut vp = Viewport {
                x: 10.0,
                y: 5.0,
                ..Viewport::default()
            };
            vp.set_scale(preset.scale().unwrap());
            assert_eq!((vp.x, vp.y), (0.0, 0.0));
        }
        assert_eq!(ZoomPreset::Quad.scale(), Some(4.0));
        assert_eq!(ZoomPreset::Fit.scale(), None);
    }

    #[test]
    fn test_drag_moves_rigidly_with_pointer() {
        let mut vp = Viewport {
            x: 10.0,
            y: 5.0,
            ..Viewport::default()
        };
        vp.begin_drag((100.0, 100.0));
        assert_eq!(vp.grab(), Some((90.0, 95.0)));
        vp.drag_to((150.0, 120.0));
        assert_eq!((vp.x, vp.y), (60.0, 25.0));

        vp.end_drag();
        vp.drag_to((500.0, 500.0));
        assert_eq!((vp.x, vp.y), (60.0, 25.0));
    }

    #[test]
    fn test_wheel_zoom_is_additive_and_clamped() {
        let mut vp = Viewport::default();
        vp.zoom_by(3.0);
        assert!(close(vp.scale, 1.2));
        vp.zoom_by(-100.0);
        assert_eq!(vp.scale, MIN_SCALE);
    }

    #[test]
    fn test_transform_centers_then_pans() {
        let t = Transform {
            scale: 2.0,
            x: 10.0,
            y: -4.0,
        };
        let image = (100.0, 50.0);
        let screen = (800.0, 600.0);
        // Image center lands on window center plus pan.
        assert_eq!(t.to_screen((50.0, 25.0), image, screen), (410.0, 296.0));
        assert_eq!(t.origin(image, screen), (310.0, 246.0));
    }
}
