//! Font family normalization and the resolution fallback chain.

use std::sync::Arc;

use crate::{
    fonts::face::{FontFace, FontStyle, FontWeight},
    fonts::store::FontStore,
    foundation::error::{RenderError, RenderResult},
};

/// Family tried when the requested one is not stored.
pub const DEFAULT_FAMILY: &str = "Montserrat";

/// Trailing name tokens that describe a face rather than a family.
const FACE_SUFFIXES: [&str; 5] = [" Bold", " Regular", " Light", " Italic", " Medium"];

/// Display names whose stored family differs, after title-casing and suffix stripping.
const FAMILY_ALIASES: [(&str, &str); 16] = [
    ("Arkana Script", "Arkana"),
    ("Blogger", "Blogger Sans"),
    ("Delius Swash", "Delius Swash Caps"),
    ("Elsie Swash", "Elsie Swash Caps"),
    ("Gluk Glametrix", "Gluk Foglihtenno06"),
    ("Gluk Znikomitno25", "Gluk Foglihtenno06"),
    ("Im Fell", "Im Fell Dw Pica Sc"),
    ("Medieval Sharp", "Medievalsharp"),
    ("Playlist Caps", "Playlist"),
    ("Rissa Typeface", "Rissatypeface"),
    ("Selima", "Selima Script"),
    ("Six", "Six Caps"),
    ("V T323", "Vt323"),
    // Unknown upstream; rendered with the default family.
    ("Different Summer", DEFAULT_FAMILY),
    ("Dukomdesign Constantine", DEFAULT_FAMILY),
    ("Sunday", DEFAULT_FAMILY),
];

/// Normalize a requested family name to its stored key.
///
/// Underscores become spaces, the name is title-cased, trailing face tokens (`Bold`, `Regular`,
/// `Light`, `Italic`, `Medium`) are stripped, and known misnamed families are aliased.
/// Normalization is idempotent.
pub fn normalize_family(name: &str) -> String {
    let mut out = title_case(&name.replace('_', " "));
    while let Some(suffix) = FACE_SUFFIXES.iter().find(|s| out.ends_with(*s)) {
        out.truncate(out.len() - suffix.len());
    }
    match FAMILY_ALIASES.iter().find(|(from, _)| *from == out) {
        Some((_, to)) => (*to).to_string(),
        None => out,
    }
}

/// Weight implied by the last space-delimited token of `name`, or `default`.
pub fn weight_from_name(name: &str, default: FontWeight) -> FontWeight {
    FontWeight::from_keyword(&last_token(name)).unwrap_or(default)
}

/// Style implied by the last space-delimited token of `name`, or `default`.
pub fn style_from_name(name: &str, default: FontStyle) -> FontStyle {
    FontStyle::from_keyword(&last_token(name)).unwrap_or(default)
}

fn last_token(name: &str) -> String {
    name.replace('_', " ")
        .to_lowercase()
        .rsplit(' ')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Uppercase the first letter of every run of cased letters and lowercase the rest.
///
/// Uncased characters (digits, punctuation, CJK) end a run.
///
/// Case mappings that would change the character count are skipped so the result stays a fixed
/// point of this function.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_cased = false;
    for c in s.chars() {
        let mapped = if prev_cased {
            single_char(c.to_lowercase()).unwrap_or(c)
        } else {
            single_char(c.to_uppercase()).unwrap_or(c)
        };
        out.push(mapped);
        prev_cased = c.is_lowercase() || c.is_uppercase();
    }
    out
}

fn single_char(mut it: impl Iterator<Item = char>) -> Option<char> {
    let c = it.next()?;
    match it.next() {
        None => Some(c),
        Some(_) => None,
    }
}

/// Shared font resolution entry point.
///
/// Cloning is cheap; every clone reads the same immutable [`FontStore`].
#[derive(Clone, Debug)]
pub struct FontResolver {
    store: Arc<FontStore>,
    default_family: String,
}

impl FontResolver {
    /// Build a resolver over a loaded store with the `Montserrat` default family.
    pub fn new(store: Arc<FontStore>) -> Self {
        Self {
            store,
            default_family: DEFAULT_FAMILY.to_string(),
        }
    }

    /// Override the family tried when a requested family is missing.
    pub fn with_default_family(mut self, family: impl Into<String>) -> Self {
        self.default_family = family.into();
        self
    }

    /// Default fallback family.
    pub fn default_family(&self) -> &str {
        &self.default_family
    }

    /// Underlying store.
    pub fn store(&self) -> &Arc<FontStore> {
        &self.store
    }

    /// Resolve a family name plus weight/style keywords to font bytes.
    ///
    /// Fails with [`RenderError::Configuration`] if the store was never loaded and with
    /// [`RenderError::Validation`] for keywords outside the recognized enumerations. Every other
    /// miss degrades through the fallback chain and is logged.
    pub fn resolve(&self, family: &str, weight: &str, style: &str) -> RenderResult<&[u8]> {
        self.resolve_face(family, weight, style)
            .map(|face| face.bytes.as_slice())
    }

    /// Like [`Self::resolve`] but returns the whole face record.
    pub fn resolve_face(&self, family: &str, weight: &str, style: &str) -> RenderResult<&FontFace> {
        self.store.ensure_loaded()?;
        let weight = weight.parse::<FontWeight>()?;
        let style = style.parse::<FontStyle>()?;
        self.resolve_typed(family, weight, style)
    }

    /// Resolve with already-validated weight and style.
    pub fn resolve_typed(
        &self,
        family: &str,
        weight: FontWeight,
        style: FontStyle,
    ) -> RenderResult<&FontFace> {
        resolve_face_in(&self.store, family, weight, style, &self.default_family)
    }
}

pub(crate) fn resolve_face_in<'a>(
    store: &'a FontStore,
    family: &str,
    weight: FontWeight,
    style: FontStyle,
    default_family: &str,
) -> RenderResult<&'a FontFace> {
    store.ensure_loaded()?;

    let faces = match store.family(&normalize_family(family)) {
        Some(found) => &found.faces,
        None => {
            tracing::warn!(family, "font family not found");
            match store.family(&normalize_family(default_family)) {
                Some(fallback) => {
                    tracing::warn!(fallback = %fallback.name, "font family fallback");
                    &fallback.faces
                }
                None => {
                    let first = store
                        .first_family()
                        .ok_or_else(|| RenderError::configuration("font store is empty"))?;
                    tracing::warn!(fallback = %first.name, "font family fallback");
                    &first.faces
                }
            }
        }
    };

    let weight = weight_from_name(family, weight);
    let style = style_from_name(family, style);

    if let Some(face) = faces.iter().find(|f| f.matches(weight, style)) {
        return Ok(face);
    }

    let face = faces
        .first()
        .ok_or_else(|| RenderError::configuration("font family has no faces"))?;
    tracing::warn!(
        family = %face.font_family,
        requested_weight = %weight,
        requested_style = %style,
        fallback_weight = %face.font_weight,
        fallback_style = %face.font_style,
        "font face not found"
    );
    Ok(face)
}

#[cfg(test)]
#[path = "../../tests/unit/fonts/resolve.rs"]
mod tests;
