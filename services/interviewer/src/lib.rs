pub mod config;
pub mod openai_adapter;
pub mod speech;
