//! Transcript text handling.

pub mod normalizer;

pub use normalizer::normalize;
