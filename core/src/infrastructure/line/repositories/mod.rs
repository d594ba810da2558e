pub mod line_extension_repository;
pub mod line_repository;
