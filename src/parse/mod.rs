pub mod parsed_model;
pub mod parser;
pub mod permission;
