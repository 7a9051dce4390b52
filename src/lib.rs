// Library for tests to access modules

pub mod classifier;
pub mod collector;
pub mod config;
pub mod diagnoser;
pub mod diagnostics;
pub mod error;
pub mod models;
pub mod parsers;
pub mod pipeline;
pub mod probes;
pub mod routes;
pub mod scoring;
pub mod solutions;
pub mod worker;
