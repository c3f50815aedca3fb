//! Entities of a ParchMint device and their validation rules.
//!
//! Every entity can be built in isolation (handy for tests) and exposes a
//! side-effect free `validate()` returning a
//! [`ValidationReport`](crate::parchmint::validation::ValidationReport).
//! Fields that a document may omit are `Option`s; validation reports a
//! missing required value instead of relying on sentinel defaults.

mod component;
mod connection;
mod coord;
mod device;
mod feature;
mod layer;
mod port;

pub use component::Component;
pub use connection::Connection;
pub use coord::Coord;
pub use device::Device;
pub use feature::{ComponentFeature, ConnectionSegment};
pub use layer::Layer;
pub use port::{Port, Terminal};
