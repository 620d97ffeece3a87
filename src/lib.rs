//! Predicts the total waste of demolishing a building from four of its attributes.
//!
//! The model is a single softplus unit over `[usage, gfa, volume, floor]`, trained with
//! leave-one-out cross-validation on a CSV of past demolitions. The numerical machinery lives
//! in the `machine_learning` crate, this crate wires it to files and the command line.

pub mod building;
pub mod cli;
pub mod config;
pub mod data;
pub mod model;
pub mod predict;
pub mod train;
