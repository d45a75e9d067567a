pub(crate) mod effects;
pub(crate) mod element;
pub(crate) mod map;
pub(crate) mod record;
pub(crate) mod text;
