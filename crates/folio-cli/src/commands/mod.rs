pub mod clients;
pub mod common;
pub mod completions;
pub mod experience;
pub mod export;
pub mod overview;
pub mod projects;
pub mod security;
