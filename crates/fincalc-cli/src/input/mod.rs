pub mod file;
pub mod rules;
pub mod stdin;
