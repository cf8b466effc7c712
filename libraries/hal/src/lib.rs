#![no_std]
extern crate alloc;

mod baro;
mod types;

pub use baro::*;
pub use types::*;
