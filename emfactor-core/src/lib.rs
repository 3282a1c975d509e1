pub mod composite;
pub mod factor;
pub mod format;
pub mod units;

pub mod errors;
