use serde::{Deserialize, Serialize};

/// Axis-aligned face box in source-image pixel coordinates.
///
/// Detection metadata can be incomplete, so zero or negative sizes are
/// representable; such boxes are degenerate and never cropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    #[serde(alias = "w")]
    pub width: i32,
    #[serde(alias = "h")]
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn area(&self) -> u64 {
        if self.is_degenerate() {
            return 0;
        }
        self.width as u64 * self.height as u64
    }

    /// Grows the box by `padding` pixels on every side and clips it to an
    /// image of `image_width` x `image_height`.
    ///
    /// Returns `None` for degenerate boxes and for boxes that fall entirely
    /// outside the image.
    pub fn padded_within(
        &self,
        padding: u32,
        image_width: u32,
        image_height: u32,
    ) -> Option<BoundingBox> {
        if self.is_degenerate() {
            return None;
        }
        let pad = padding as i64;
        let x1 = (self.x as i64 - pad).max(0);
        let y1 = (self.y as i64 - pad).max(0);
        let x2 = (self.x as i64 + self.width as i64 + pad).min(image_width as i64);
        let y2 = (self.y as i64 + self.height as i64 + pad).min(image_height as i64);

        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(BoundingBox {
            x: x1 as i32,
            y: y1 as i32,
            width: (x2 - x1) as i32,
            height: (y2 - y1) as i32,
        })
    }
}
