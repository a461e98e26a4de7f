pub mod chat;
pub mod health;
pub mod share_packs;
