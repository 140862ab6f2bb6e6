pub mod cli;
pub mod predict;
pub mod study;
pub mod util;
