#[macro_use]
extern crate rocket;

pub mod app;
pub mod args;
pub mod cors;
pub mod error;
pub mod logging;
pub mod models;
pub mod recognition;
pub mod routes;
pub mod state;
pub mod stream;
