pub mod command_lexer;
pub mod config_loader;
pub mod contest;
pub mod freeze_scroll;
pub mod interpreter;
pub mod query_engine;
pub mod ranking_index;
pub mod snapshot;
pub mod submission_processor;
