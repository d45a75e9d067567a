use crate::foundation::core::unpremultiply_px;

/// A rendered page as RGBA8 pixels.
///
/// Frames produced by [`crate::Canvas::into_frame`] are premultiplied; the flag makes that
/// explicit at API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Straight-alpha RGBA8 bytes at pixel `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        let px = [px[0], px[1], px[2], px[3]];
        Some(if self.premultiplied {
            unpremultiply_px(px)
        } else {
            px
        })
    }

    /// Convert the frame to straight alpha.
    pub fn into_straight(mut self) -> Self {
        if self.premultiplied {
            for px in self.data.chunks_exact_mut(4) {
                let out = unpremultiply_px([px[0], px[1], px[2], px[3]]);
                px.copy_from_slice(&out);
            }
            self.premultiplied = false;
        }
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
