//! Implementation of the `#[derive(Component)]` macro.

mod attrs;
mod derive;

pub use derive::component_derive_impl;
