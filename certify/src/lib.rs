// Creation of reference integral files and certification runs against them.

pub mod app;
pub mod config;
pub mod io;
