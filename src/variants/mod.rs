pub(crate) mod lloyd;
