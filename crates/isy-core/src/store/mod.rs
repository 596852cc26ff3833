//! Entity storage: the [`Registry`] and its ordered collections.

mod collection;
mod registry;

pub use registry::Registry;
