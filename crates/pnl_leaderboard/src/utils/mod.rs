pub mod annotation_keys;
pub mod errors;
pub mod math;
pub mod time;
pub mod wallet;
