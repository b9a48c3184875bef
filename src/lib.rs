//! Quantum-Morph - guided experiment wizard for biochar optimization
//!
//! This crate walks a user through a branching conversation that collects
//! experiment parameters, submits them to the remote optimizer, polls the
//! job to completion and renders the result as a scientific report.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
