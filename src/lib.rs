// src/lib.rs

//! SIHN tide-gauge sync library

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;
