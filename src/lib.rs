pub mod ai;
pub mod cancel;
pub mod cli;
pub mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod interactive;
pub mod photo;
pub mod scanner;
pub mod surface;
