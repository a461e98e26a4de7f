//! EverMed backend: personal health records with citation-backed question
//! answering, keyword safety gating, and passcode-protected share packs.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod passcode;
pub mod rag;
pub mod safety;
