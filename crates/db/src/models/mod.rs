//! Database row types.

pub mod media_item;
pub mod olympics_year;
