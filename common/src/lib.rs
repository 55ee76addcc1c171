// Common library for the content-repository schedule agent

pub mod agent;
pub mod config;
pub mod descriptor;
pub mod errors;
pub mod models;
pub mod repository;
pub mod runner;
pub mod schedule;
pub mod task;
pub mod telemetry;
