pub mod config;
pub mod lexicon;
pub mod server;
