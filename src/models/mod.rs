// src/models/mod.rs

pub mod cargo;
pub mod scan;
pub mod warehouse;

pub use cargo::*;
pub use scan::*;
pub use warehouse::*;
