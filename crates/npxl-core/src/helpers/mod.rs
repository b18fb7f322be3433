// crates/npxl-core/src/helpers/mod.rs

pub mod time;
