pub(crate) mod backend;
pub(crate) mod cpu;
#[cfg(feature = "gpu")]
pub(crate) mod gpu;
pub(crate) mod renderer;
pub(crate) mod shader;
pub(crate) mod state;
