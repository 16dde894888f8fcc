pub mod analyze;
pub mod settings;
