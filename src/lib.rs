//! Rain outlook for the 32 states of Mexico, from OpenWeather current conditions and
//! 5-day / 3-hour forecasts.

pub mod analysis;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod fetch;
pub mod location;
pub mod stats;
pub mod table;
pub mod views;
