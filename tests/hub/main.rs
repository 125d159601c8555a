#[path = "../common/mod.rs"]
mod common;

mod channel_creation;
mod channel_lifecycle;
mod concurrency;
mod config_file;
mod item_links;
mod item_pages;
mod retention;
