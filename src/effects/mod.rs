pub(crate) mod composite;
pub(crate) mod interpolate;
pub(crate) mod transitions;
