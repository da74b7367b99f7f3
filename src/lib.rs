//! Aroma Lens: explore a catalogue of aroma agents and their documented
//! effects through a fixed set of questions, each answered by one or more
//! charts.

pub mod analysis;
pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod state;
pub mod ui;
