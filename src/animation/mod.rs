pub(crate) mod ease;
pub(crate) mod text;
pub(crate) mod tween;
pub(crate) mod value;
