//! Validated action registry for Ferrule.
//!
//! Controllers declare their methods explicitly; [`RegistryBuilder`]
//! classifies every declaration and freezes the valid ones into an
//! [`ActionRegistry`] before any request is served.
//!
//! # Classification
//!
//! | Routed | Returns `ActionResult` | Public | Outcome |
//! |--------|------------------------|--------|---------|
//! | no | no | any | not an action, skipped |
//! | yes | yes | yes | registered |
//! | yes | no | any | [`RegistrationFault::RouteWithoutActionResult`] |
//! | no | yes | any | [`RegistrationFault::ActionResultWithoutRoute`] |
//! | yes | yes | no | [`RegistrationFault::NotPublic`] |
//!
//! A second action on an already registered verb and path fails with
//! [`RegistrationFault::DuplicateRoute`].
//!
//! # Matching
//!
//! Lookup is exact string equality on verb and path. There are no wildcards
//! and no trailing-slash normalization; `/users` and `/users/` are distinct.

#![doc(html_root_url = "https://docs.rs/ferrule-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod controller;
mod descriptor;
mod error;
mod registry;
mod route;

pub use controller::{Controller, MethodDecl, Visibility};
pub use descriptor::ActionDescriptor;
pub use error::RegistrationFault;
pub use registry::{ActionRegistry, RegistryBuilder};
pub use route::Route;
