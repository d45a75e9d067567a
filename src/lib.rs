//! cr-renderer rasterizes graphic-design template records into preview images.
//!
//! A document is a canvas size plus index-aligned per-element arrays describing positioned text
//! and image elements. Rendering:
//!
//! - Load a [`FontStore`] (from a packed blob or a font directory)
//! - Build a [`Renderer`] over it
//! - Render a [`DocumentRecord`] (or a [`LegacyDocumentRecord`]) to JPEG or PNG bytes
//!
//! Font lookups never fail on a missing family or face; they fall back through a fixed chain and
//! log a warning. Everything else that is wrong with the input is a [`RenderError`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod document;
mod encode;
mod fonts;
mod foundation;
mod legacy;
mod render;

pub use crate::foundation::core::{Affine, Point, Rect, Rgba8, Vec2};
pub use crate::foundation::error::{RenderError, RenderResult};

pub use crate::fonts::face::{FontFace, FontStyle, FontWeight};
pub use crate::fonts::resolve::{
    DEFAULT_FAMILY, FontResolver, normalize_family, style_from_name, weight_from_name,
};
pub use crate::fonts::store::{FontFamily, FontStore};

pub use crate::document::effects::TextEffect;
pub use crate::document::element::{DesignElement, ElementKind};
pub use crate::document::map::{
    MapValue, TextMapItem, build_interval_map, lookup_interval, value_at,
};
pub use crate::document::record::{DocumentRecord, ImagePayload};
pub use crate::document::text::{TextAlign, TextElement, TextProperty, WordBreak};
pub use crate::legacy::record::LegacyDocumentRecord;

pub use crate::assets::decode::{
    DecodedImage, decode_image, decode_payload, is_svg, rasterize_svg,
};
pub use crate::encode::codec::{OutputFormat, encode_frame};

pub use crate::render::batch::render_batch;
pub use crate::render::canvas::{Canvas, CanvasFont, CanvasGuard, PositionedGlyph};
pub use crate::render::frame::FrameRGBA;
pub use crate::render::pipeline::{RenderOpts, Renderer, parse_document_json, render};
pub use crate::render::scale::{FitScale, fit_scale};
pub use crate::render::text::{ParleyTextRenderer, TextBrush, TextRenderer};
