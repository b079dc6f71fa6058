#[macro_use]
extern crate log;

pub mod shell;

pub use shell::{Config, Flow, Shell};
