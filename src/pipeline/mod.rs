pub(crate) mod buffer;
pub(crate) mod element;
pub(crate) mod group;
pub(crate) mod port;
