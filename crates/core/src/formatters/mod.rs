pub mod json;

pub use json::{JsonConfig, JsonFormatter, convert_to_json};
