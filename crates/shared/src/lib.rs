pub mod achievements;
pub mod config;
pub mod demo;
pub mod features;
pub mod fetch;
pub mod geo;
pub mod models;
pub mod scoring;
pub mod storage;
