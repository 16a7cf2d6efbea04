#![no_std]

extern crate alloc;

pub mod control;
pub mod controller;
pub mod display;
pub mod error;
pub mod pump;
pub mod runner;
pub mod sensor;
pub mod status;
pub mod time;

pub use control::*;
pub use controller::*;
pub use error::*;
pub use runner::*;
