//! 夹爪梯形几何
//!
//! 梯形参数以图像高度为单位：底边贴住图像底部，水平居中。

use contracts::TrapezoidParams;
use image::{GrayImage, Luma};

/// Gripper trapezoid in pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrapezoidMask {
    params: TrapezoidParams,
}

impl Default for TrapezoidMask {
    fn default() -> Self {
        Self::new(TrapezoidParams::default())
    }
}

impl TrapezoidMask {
    pub fn new(params: TrapezoidParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> TrapezoidParams {
        self.params
    }

    /// Corners in pixels: bottom-left, top-left, top-right, bottom-right
    pub fn polygon(&self, width: u32, height: u32) -> [(f64, f64); 4] {
        let h = height as f64;
        let middle_x = width as f64 / h / 2.0;

        let top_y = (1.0 - self.params.height) * h;
        let bottom_y = h;
        let top_left_x = (middle_x - self.params.top_width / 2.0) * h;
        let top_right_x = (middle_x + self.params.top_width / 2.0) * h;
        let bottom_left_x = (middle_x - self.params.bottom_width / 2.0) * h;
        let bottom_right_x = (middle_x + self.params.bottom_width / 2.0) * h;

        [
            (bottom_left_x, bottom_y),
            (top_left_x, top_y),
            (top_right_x, top_y),
            (bottom_right_x, bottom_y),
        ]
    }

    /// Horizontal pixel-centre span covered on row `y`, if any
    pub fn row_span(&self, width: u32, height: u32, y: u32) -> Option<(u32, u32)> {
        let [(bl_x, bottom_y), (tl_x, top_y), (tr_x, _), (br_x, _)] = self.polygon(width, height);
        let yc = y as f64 + 0.5;
        if yc < top_y || yc > bottom_y || bottom_y <= top_y {
            return None;
        }

        // 0 at the bottom edge, 1 at the top edge
        let t = (bottom_y - yc) / (bottom_y - top_y);
        let left = bl_x + (tl_x - bl_x) * t;
        let right = br_x + (tr_x - br_x) * t;

        // pixel x is covered when x + 0.5 lies in [left, right]
        let first = (left - 0.5).ceil().max(0.0);
        let last = (right - 0.5).floor().min(width as f64 - 1.0);
        if last < first {
            return None;
        }
        Some((first as u32, last as u32))
    }

    /// Rasterize: 255 inside the trapezoid, 0 elsewhere
    pub fn render(&self, width: u32, height: u32) -> GrayImage {
        let mut image = GrayImage::new(width, height);
        self.fill(&mut image, 255);
        image
    }

    /// Set every covered pixel of `image` to `value`
    pub fn fill(&self, image: &mut GrayImage, value: u8) {
        let (width, height) = image.dimensions();
        for y in 0..height {
            if let Some((first, last)) = self.row_span(width, height, y) {
                for x in first..=last {
                    image.put_pixel(x, y, Luma([value]));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polygon_for_default_params() {
        let poly = TrapezoidMask::default().polygon(960, 540);

        let (bl, tl, tr, br) = (poly[0], poly[1], poly[2], poly[3]);
        assert_eq!(bl.1, 540.0);
        assert!((tl.1 - 0.63 * 540.0).abs() < 1e-9);
        assert!((tl.0 - (480.0 - 0.125 * 540.0)).abs() < 1e-9);
        assert!((tr.0 - (480.0 + 0.125 * 540.0)).abs() < 1e-9);
        assert!((br.0 - (480.0 + 0.7 * 540.0)).abs() < 1e-9);
        // symmetric about the vertical centre line
        assert!((bl.0 + br.0 - 960.0).abs() < 1e-9);
    }

    #[test]
    fn render_covers_bottom_centre_only() {
        let mask = TrapezoidMask::default().render(960, 540);

        assert_eq!(mask.get_pixel(480, 539)[0], 255);
        assert_eq!(mask.get_pixel(480, 400)[0], 255);
        assert_eq!(mask.get_pixel(480, 100)[0], 0);
        assert_eq!(mask.get_pixel(0, 539)[0], 0);
        assert_eq!(mask.get_pixel(959, 539)[0], 0);
        // narrow at the top
        assert_eq!(mask.get_pixel(300, 345)[0], 0);
        // wide at the bottom
        assert_eq!(mask.get_pixel(150, 538)[0], 255);
    }

    #[test]
    fn wide_trapezoid_is_clipped_to_image() {
        let trapezoid = TrapezoidMask::new(TrapezoidParams {
            height: 1.0,
            top_width: 10.0,
            bottom_width: 10.0,
        });
        let mask = trapezoid.render(20, 10);
        assert!(mask.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn zero_height_covers_nothing() {
        let trapezoid = TrapezoidMask::new(TrapezoidParams {
            height: 0.0,
            top_width: 0.5,
            bottom_width: 0.5,
        });
        assert!(trapezoid.render(16, 9).pixels().all(|p| p[0] == 0));
    }
}
