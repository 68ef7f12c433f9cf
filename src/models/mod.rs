//! Domain models for the hbnb console.
//!
//! # Core Concepts
//!
//! - [`StoredObject`]: one model instance, an identity plus an open
//!   [`Attributes`] bag of primitive [`Value`]s.
//! - [`Registry`]: the closed set of [`ModelClass`]es. Every class name the
//!   console or the store sees is resolved here before anything else happens.
//!
//! Model classes carry no schema of their own; any attribute name is
//! accepted except the identity fields listed in [`RESERVED_ATTRIBUTES`].

mod object;
mod registry;
mod value;

pub use object::*;
pub use registry::*;
pub use value::Value;
