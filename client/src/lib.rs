mod app;
mod dom;
mod logging;
mod palette;
mod persistence;
mod surface;

pub use app::run;
