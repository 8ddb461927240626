pub(crate) mod clip_group;
