pub mod add;
pub mod canvas;
pub mod chat;
pub mod config;
pub mod doctor;
pub mod export;
pub mod finalize;
pub mod input;
pub mod list;
pub mod menu;
pub mod new;
pub mod open;
pub mod questions;
pub mod validate;
