pub(crate) mod compose;
pub(crate) mod def;
pub(crate) mod playback;
pub(crate) mod sink;
