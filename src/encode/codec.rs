use std::{fmt, io::Cursor, str::FromStr};

use anyhow::Context;
use image::ImageEncoder;

use crate::{
    foundation::core::{mul_div255, premultiply_rgba8_in_place},
    foundation::error::{RenderError, RenderResult},
    render::frame::FrameRGBA,
};

/// Encoded output image format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Baseline JPEG; alpha is flattened over the background.
    #[default]
    Jpeg,
    /// Lossless RGBA PNG.
    Png,
}

impl OutputFormat {
    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> RenderResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            other => Err(RenderError::validation(format!(
                "unsupported output format '{other}'"
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        })
    }
}

/// Encode a frame to image file bytes.
///
/// JPEG output flattens any remaining transparency over `background` (straight RGBA8).
pub fn encode_frame(
    frame: &FrameRGBA,
    format: OutputFormat,
    jpeg_quality: u8,
    background: [u8; 4],
) -> RenderResult<Vec<u8>> {
    let expected = (frame.width as usize)
        .saturating_mul(frame.height as usize)
        .saturating_mul(4);
    if frame.data.len() != expected {
        return Err(RenderError::validation(format!(
            "frame buffer has {} bytes, expected {expected}",
            frame.data.len()
        )));
    }

    let mut buf = Vec::new();
    match format {
        OutputFormat::Jpeg => {
            if !(1..=100).contains(&jpeg_quality) {
                return Err(RenderError::configuration(format!(
                    "jpeg quality {jpeg_quality} outside 1..=100"
                )));
            }
            let mut premul = frame.data.clone();
            if !frame.premultiplied {
                premultiply_rgba8_in_place(&mut premul);
            }
            let rgb = flatten_premul_to_rgb8(&premul, background);
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut Cursor::new(&mut buf), jpeg_quality)
                .write_image(&rgb, frame.width, frame.height, image::ExtendedColorType::Rgb8)
                .context("encode jpeg")?;
        }
        OutputFormat::Png => {
            let straight = frame.clone().into_straight();
            image::codecs::png::PngEncoder::new(&mut Cursor::new(&mut buf))
                .write_image(
                    &straight.data,
                    frame.width,
                    frame.height,
                    image::ExtendedColorType::Rgba8,
                )
                .context("encode png")?;
        }
    }
    Ok(buf)
}

fn flatten_premul_to_rgb8(src_premul: &[u8], bg_rgba: [u8; 4]) -> Vec<u8> {
    let bg = [bg_rgba[0] as u16, bg_rgba[1] as u16, bg_rgba[2] as u16];
    let mut out = Vec::with_capacity(src_premul.len() / 4 * 3);
    for s in src_premul.chunks_exact(4) {
        let inv = 255u16 - s[3] as u16;
        for c in 0..3 {
            let v = s[c] as u16 + mul_div255(bg[c], inv);
            out.push(v.min(255) as u8);
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/encode/codec.rs"]
mod tests;
