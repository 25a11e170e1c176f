pub mod capture;
pub mod collector;
pub mod config;
pub mod cooccurrence;
pub mod error;
pub mod frequency;
pub mod lexicon;
pub mod models;
pub mod normalizer;
pub mod progress;
pub mod sentiment;
pub mod sink;
pub mod tokenization;
