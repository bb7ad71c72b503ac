//! Core library for the create-stellar-app toolkit.
//!
//! Bootstraps a Stellar dApp project by running a strictly forward pipeline:
//!
//! 1. [`locator`] finds the template root that holds the requested template
//! 2. [`materialize`] copies the template tree into a fresh target directory
//! 3. [`contracts`] optionally overlays the Soroban contracts add-on
//! 4. [`substitute`] rewrites the generated files, replacing placeholder tokens
//! 5. [`install`] delegates dependency installation to a package manager
//!
//! [`scaffold::Scaffolder`] sequences the stages and turns failures into
//! [`error::ScaffoldError`] values that name the offending input.

pub mod contracts;
pub mod error;
pub mod install;
pub mod locator;
pub mod materialize;
pub mod request;
pub mod scaffold;
pub mod substitute;
