use std::{collections::HashMap, path::Path};

use anyhow::Context;

use crate::{
    fonts::face::{FontFace, FontStyle, FontWeight},
    fonts::resolve::{self, DEFAULT_FAMILY, normalize_family},
    foundation::error::{RenderError, RenderResult},
};

/// All faces stored under one normalized family name.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FontFamily {
    /// Normalized family name used as the lookup key.
    pub name: String,
    /// Faces in stored order; the first one is the family-level fallback.
    pub faces: Vec<FontFace>,
}

impl FontFamily {
    /// Build a family entry.
    pub fn new(name: impl Into<String>, faces: Vec<FontFace>) -> Self {
        Self {
            name: name.into(),
            faces,
        }
    }
}

/// Serialized blob layout: ordered `(family, faces)` pairs.
type FontBlob = Vec<(String, Vec<FontFace>)>;

/// Mapping from normalized family name to its font faces.
///
/// A store is built once (load, pack, or programmatic construction) and is read-only afterwards;
/// share it across renderers behind an `Arc`. Reloading needs `&mut self`, so it cannot race with
/// lookups through shared references.
#[derive(Clone, Debug, Default)]
pub struct FontStore {
    families: Vec<FontFamily>,
    index: HashMap<String, usize>,
    loaded: bool,
}

impl FontStore {
    /// Create an empty, not-yet-loaded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store and load it from a blob file.
    pub fn from_path(path: impl AsRef<Path>) -> RenderResult<Self> {
        let mut store = Self::new();
        store.load(path)?;
        Ok(store)
    }

    /// Build a loaded store from family entries, keeping their order.
    ///
    /// Entries sharing a name are merged; families without faces are skipped.
    pub fn from_families(families: impl IntoIterator<Item = FontFamily>) -> RenderResult<Self> {
        let mut store = Self::new();
        store.replace(families.into_iter().map(|f| (f.name, f.faces)).collect())?;
        Ok(store)
    }

    /// Pack every TTF/OTF face found in `dir` into a loaded store.
    ///
    /// Family keys are normalized display names. Numeric weights snap to the nine levels; bold
    /// upright faces get style `bold` and bold italic faces `bolditalic`, as in the dataset.
    pub fn from_font_dir(dir: impl AsRef<Path>) -> RenderResult<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(RenderError::load(format!(
                "font directory '{}' does not exist",
                dir.display()
            )));
        }

        let mut db = usvg::fontdb::Database::new();
        db.load_fonts_dir(dir);

        let mut infos: Vec<_> = db.faces().collect();
        infos.sort_by(|a, b| {
            let fa = a.families.first().map(|(n, _)| n.as_str()).unwrap_or("");
            let fb = b.families.first().map(|(n, _)| n.as_str()).unwrap_or("");
            fa.cmp(fb)
                .then(a.weight.0.cmp(&b.weight.0))
                .then(a.post_script_name.cmp(&b.post_script_name))
        });

        let mut blob: FontBlob = Vec::new();
        for info in infos {
            let Some((family, _)) = info.families.first() else {
                continue;
            };
            if info.index != 0 {
                tracing::warn!(family = %family, index = info.index, "skipping collection face");
                continue;
            }
            let Some(bytes) = db.with_face_data(info.id, |data, _| data.to_vec()) else {
                continue;
            };
            let weight = FontWeight::from_numeric(info.weight.0);
            let italic = !matches!(info.style, usvg::fontdb::Style::Normal);
            let style = match (weight.is_bold(), italic) {
                (true, true) => FontStyle::BoldItalic,
                (true, false) => FontStyle::Bold,
                (false, true) => FontStyle::Italic,
                (false, false) => FontStyle::Regular,
            };

            let key = normalize_family(family);
            let face = FontFace::new(family.clone(), weight, style, bytes);
            match blob.iter_mut().find(|(name, _)| *name == key) {
                Some((_, faces)) => faces.push(face),
                None => blob.push((key, vec![face])),
            }
        }

        let mut store = Self::new();
        store.replace(blob)?;
        tracing::info!(
            dir = %dir.display(),
            families = store.len(),
            "packed font directory"
        );
        Ok(store)
    }

    /// Load (or reload) the store from a blob file.
    ///
    /// On failure the previous contents are kept.
    #[tracing::instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn load(&mut self, path: impl AsRef<Path>) -> RenderResult<()> {
        let path = path.as_ref();
        tracing::info!("loading fonts");
        let bytes = std::fs::read(path).map_err(|e| {
            RenderError::load(format!("read font store '{}': {e}", path.display()))
        })?;
        self.load_bytes(&bytes)
    }

    /// Load (or reload) the store from blob bytes.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> RenderResult<()> {
        if bytes.is_empty() {
            return Err(RenderError::load("font store blob is empty"));
        }
        let blob: FontBlob = bincode::deserialize(bytes)
            .map_err(|e| RenderError::load(format!("decode font store: {e}")))?;
        self.replace(blob)?;
        tracing::info!(families = self.len(), "loaded font families");
        Ok(())
    }

    /// Serialize the store into blob bytes.
    pub fn to_bytes(&self) -> RenderResult<Vec<u8>> {
        if !self.loaded {
            return Err(RenderError::state("fonts not loaded yet"));
        }
        let blob: Vec<(&String, &Vec<FontFace>)> =
            self.families.iter().map(|f| (&f.name, &f.faces)).collect();
        bincode::serialize(&blob).map_err(|e| RenderError::serde(format!("encode font store: {e}")))
    }

    /// Write the store to a blob file.
    pub fn save(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        tracing::info!(path = %path.display(), "saving fonts");
        std::fs::write(path, bytes)
            .with_context(|| format!("write font store '{}'", path.display()))?;
        Ok(())
    }

    /// Return `true` once a load (or construction) succeeded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Number of families.
    pub fn len(&self) -> usize {
        self.families.len()
    }

    /// Return `true` when no family is stored.
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Families in stored order.
    pub fn families(&self) -> impl Iterator<Item = &FontFamily> {
        self.families.iter()
    }

    /// Exact lookup by normalized family name.
    pub fn family(&self, name: &str) -> Option<&FontFamily> {
        self.index.get(name).map(|&i| &self.families[i])
    }

    /// First family in stored order, the last resort of the fallback chain.
    pub fn first_family(&self) -> Option<&FontFamily> {
        self.families.first()
    }

    /// Resolve `family`/`weight`/`style` to font bytes, falling back to `Montserrat`.
    ///
    /// See [`crate::FontResolver::resolve`] for the full algorithm.
    pub fn lookup(&self, family: &str, weight: &str, style: &str) -> RenderResult<&[u8]> {
        let weight = weight.parse::<FontWeight>();
        let style = style.parse::<FontStyle>();
        self.ensure_loaded()?;
        let face = resolve::resolve_face_in(self, family, weight?, style?, DEFAULT_FAMILY)?;
        Ok(face.bytes.as_slice())
    }

    pub(crate) fn ensure_loaded(&self) -> RenderResult<()> {
        if self.loaded {
            Ok(())
        } else {
            Err(RenderError::configuration("fonts not loaded yet"))
        }
    }

    fn replace(&mut self, blob: FontBlob) -> RenderResult<()> {
        let mut families: Vec<FontFamily> = Vec::with_capacity(blob.len());
        let mut index = HashMap::with_capacity(blob.len());
        for (name, faces) in blob {
            if faces.is_empty() {
                tracing::warn!(family = %name, "skipping font family without faces");
                continue;
            }
            match index.get(&name) {
                Some(&i) => {
                    let existing: &mut FontFamily = &mut families[i];
                    existing.faces.extend(faces);
                }
                None => {
                    index.insert(name.clone(), families.len());
                    families.push(FontFamily::new(name, faces));
                }
            }
        }
        if families.is_empty() {
            return Err(RenderError::load("no font loaded"));
        }
        self.families = families;
        self.index = index;
        self.loaded = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/fonts/store.rs"]
mod tests;
