pub mod admin;
pub mod agent;
pub mod audit;
pub mod dossier;
pub mod info;
pub mod init;
pub mod monitor;
pub mod task;
