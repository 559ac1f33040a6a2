pub(crate) mod orchestrator;
pub(crate) mod stats;
pub(crate) mod wait;
