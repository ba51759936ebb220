use crate::plot::types::PlotOptions;

/// Pure affine mapping between domain coordinates
/// (x in [x_min, x_max], y in [y_min, y_max]) and surface pixels.
/// Stateless: recomputed whenever the surface or domain changes.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceTransform {
    width: u32,
    height: u32,
    padding: u32,
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl SurfaceTransform {
    pub fn new(opts: &PlotOptions, domain: (f64, f64)) -> Self {
        Self {
            width: opts.width,
            height: opts.height,
            padding: opts.padding,
            x_min: domain.0,
            x_max: domain.1,
            y_min: opts.y_min,
            y_max: opts.y_max,
        }
    }

    // Degenerate surfaces (smaller than their own padding) clamp to a
    // one-pixel interior instead of underflowing.
    fn inner_width(&self) -> f64 {
        self.width.saturating_sub(2 * self.padding).max(1) as f64
    }

    fn inner_height(&self) -> f64 {
        self.height.saturating_sub(2 * self.padding).max(1) as f64
    }

    fn x_scale(&self) -> f64 {
        self.inner_width() / (self.x_max - self.x_min)
    }

    fn y_scale(&self) -> f64 {
        self.inner_height() / (self.y_max - self.y_min)
    }

    pub fn x_to_px(&self, x: f64) -> i32 {
        (self.padding as f64 + (x - self.x_min) * self.x_scale()).round() as i32
    }

    /// Surface y grows downward, so the y term is inverted.
    pub fn y_to_px(&self, y: f64) -> i32 {
        (self.padding as f64 + self.inner_height() - (y - self.y_min) * self.y_scale()).round()
            as i32
    }

    /// Domain point to surface pixel.
    pub fn to_surface(&self, x: f64, y: f64) -> (i32, i32) {
        (self.x_to_px(x), self.y_to_px(y))
    }

    /// Horizontal-only inverse: surface pixel column back to domain x.
    /// Click input only carries an x-intent.
    pub fn to_domain(&self, px: i32) -> f64 {
        self.x_min + (px as f64 - self.padding as f64) / self.x_scale()
    }

    /// Map a clicked pixel column to a domain x, or `None` when it falls
    /// outside the domain (such clicks are ignored, not clamped).
    pub fn pick(&self, px: i32) -> Option<f64> {
        let x = self.to_domain(px);
        (x >= self.x_min && x <= self.x_max).then_some(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform() -> SurfaceTransform {
        SurfaceTransform::new(&PlotOptions::default(), (-5.0, 5.0))
    }

    #[test]
    fn test_corners() {
        let t = transform();
        // Left edge of the domain lands on the padding column
        assert_eq!(t.x_to_px(-5.0), 60);
        assert_eq!(t.x_to_px(5.0), 740);
        // y is inverted: y_max at the top padding row
        assert_eq!(t.y_to_px(10.0), 60);
        assert_eq!(t.y_to_px(-10.0), 540);
    }

    #[test]
    fn test_origin_centered() {
        let t = transform();
        assert_eq!(t.to_surface(0.0, 0.0), (400, 300));
    }

    #[test]
    fn test_round_trip_within_one_pixel() {
        let t = transform();
        // One pixel of horizontal advance in domain units
        let pixel_res = 10.0 / 680.0;
        for i in 0..=100 {
            let x = -5.0 + 10.0 * i as f64 / 100.0;
            let back = t.to_domain(t.x_to_px(x));
            assert!(
                (back - x).abs() <= pixel_res,
                "x = {}, round trip = {}",
                x,
                back
            );
        }
    }

    #[test]
    fn test_pick_inside_domain() {
        let t = transform();
        let x = t.pick(400).unwrap();
        assert!(x.abs() < 0.01);
    }

    #[test]
    fn test_pick_outside_domain_rejected() {
        let t = transform();
        assert_eq!(t.pick(0), None);
        assert_eq!(t.pick(799), None);
    }

    #[test]
    fn test_surface_smaller_than_padding_does_not_panic() {
        let opts = PlotOptions {
            width: 10,
            height: 10,
            ..PlotOptions::default()
        };
        let t = SurfaceTransform::new(&opts, (-5.0, 5.0));
        let (px, py) = t.to_surface(0.0, 0.0);
        assert!(px >= 0);
        assert!(py >= 0);
        let _ = t.pick(5);
    }

    #[test]
    fn test_asymmetric_domain() {
        let t = SurfaceTransform::new(&PlotOptions::default(), (-2.0, 3.0));
        assert_eq!(t.x_to_px(-2.0), 60);
        assert_eq!(t.x_to_px(3.0), 740);
        let back = t.to_domain(t.x_to_px(1.0));
        assert!((back - 1.0).abs() <= 5.0 / 680.0);
    }
}
