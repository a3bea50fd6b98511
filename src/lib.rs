pub mod dashboard;
pub mod fetch;
pub mod output;
pub mod parser;
pub mod render;
pub mod time;
pub mod traffic;
