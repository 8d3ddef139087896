pub mod parser;
pub mod script;
pub mod writer;
