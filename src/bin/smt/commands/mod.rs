//! Command implementations

pub mod check;
pub mod children;
pub mod completions;
pub mod deps;
pub mod encode;
pub mod generate;
pub mod history;
pub mod package_id;
pub mod resolve;
pub mod show;
