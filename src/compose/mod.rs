pub(crate) mod group_table;
pub(crate) mod timeline;
