pub mod module;
pub mod parse;
pub mod sections;
