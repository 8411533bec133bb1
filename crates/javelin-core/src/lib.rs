#![forbid(unsafe_code)]

mod name;
mod text;

pub use crate::name::Name;
pub use crate::text::LineMap;

pub use text_size::{TextRange, TextSize};
