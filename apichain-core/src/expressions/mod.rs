mod path;
mod template;

pub use path::{extract, ExtractionError};
pub use template::{parse_template, placeholders, Segment, Template};
