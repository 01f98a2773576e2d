pub mod canvas;
pub mod config;
pub mod domain;
pub mod services;
