pub mod admin;
pub mod gallery;
pub mod storage_events;
