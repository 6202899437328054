pub mod controller;
mod controller_test;
pub mod core;
pub mod render;
pub mod response;
pub mod run_effect;
