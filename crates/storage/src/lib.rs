#![forbid(unsafe_code)]

pub mod file;
pub mod records;
pub mod repository;
pub mod sqlite;
pub mod transfer;
