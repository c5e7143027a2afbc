mod client;
mod message;
mod parser;

pub use client::run_feed;
pub use message::SbsMessage;
pub use parser::parse;
