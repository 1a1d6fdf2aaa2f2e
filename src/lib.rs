//! Terminal map that highlights the nearest regions whose combined population
//! reaches a reference city's population.

pub mod app;
pub mod braille;
pub mod config;
pub mod data;
pub mod map;
pub mod ranking;
pub mod region;
pub mod ui;
