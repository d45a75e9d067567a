use std::sync::Arc;

use rayon::prelude::*;

use crate::{
    document::record::DocumentRecord,
    fonts::store::FontStore,
    foundation::error::{RenderError, RenderResult},
    render::pipeline::{RenderOpts, Renderer},
};

/// Render independent documents in parallel.
///
/// Each rayon worker owns a [`Renderer`]; all workers share the read-only `store`. Results are
/// returned in input order, one per document, so a failing document does not hide the others.
/// `threads` pins the pool size; `Some(0)` is rejected.
#[tracing::instrument(skip(store, docs, opts), fields(docs = docs.len()))]
pub fn render_batch(
    store: Arc<FontStore>,
    docs: &[DocumentRecord],
    opts: &RenderOpts,
    threads: Option<usize>,
) -> RenderResult<Vec<RenderResult<Vec<u8>>>> {
    store.ensure_loaded()?;
    let pool = build_thread_pool(threads)?;
    tracing::info!(threads = pool.current_num_threads(), "rendering batch");

    let out = pool.install(|| {
        docs.par_iter()
            .map_init(
                || Renderer::new(store.clone()),
                |renderer, doc| match renderer {
                    Ok(r) => r.render(doc, opts),
                    Err(e) => Err(RenderError::configuration(e.to_string())),
                },
            )
            .collect()
    });
    Ok(out)
}

fn build_thread_pool(threads: Option<usize>) -> RenderResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(RenderError::configuration(
            "batch 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| RenderError::configuration(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/batch.rs"]
mod tests;
