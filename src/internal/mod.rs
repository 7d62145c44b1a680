//! Internal implementation details.

pub(crate) mod circular;
pub(crate) mod lifecycle;

pub(crate) use circular::ResolutionPath;
pub(crate) use lifecycle::SingletonCache;
