pub(crate) mod batch;
pub(crate) mod canvas;
pub(crate) mod frame;
pub(crate) mod pipeline;
pub(crate) mod scale;
pub(crate) mod text;
