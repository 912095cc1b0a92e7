mod format;
mod path;

pub use format::{file_slug, format_age, format_timestamp};
pub use path::has_extension;
