pub mod app;
pub mod catalog;
pub mod checksum;
pub mod config;
pub mod disk;
pub mod download;
pub mod error;
pub mod extract;
pub mod http;
pub mod output;
pub mod zenodo;
