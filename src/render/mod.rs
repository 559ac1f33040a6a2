pub(crate) mod frame;
pub(crate) mod layout;
pub(crate) mod surface;
pub(crate) mod text;
#[cfg(feature = "display")]
pub(crate) mod window;
