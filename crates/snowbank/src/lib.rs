#![doc = include_str!("../README.md")]

mod error;
mod generator;
mod scope;
mod store;

pub use crate::error::*;
pub use crate::generator::*;
pub use crate::store::*;
