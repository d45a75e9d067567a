pub(crate) mod face;
pub(crate) mod resolve;
pub(crate) mod store;
