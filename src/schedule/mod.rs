pub(crate) mod link;
pub(crate) mod timer;
