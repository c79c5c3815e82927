pub mod arg_parser;
pub mod button;
pub mod config_manager;
pub mod daemon_manager;
pub mod dispatcher;
pub mod errors;
pub mod link;
pub mod logger;
pub mod protocol;
pub mod signals;
pub mod thermal;

#[cfg(test)]
mod testing;
