pub mod ask;
pub mod chat;
pub mod research;
pub mod search;
pub mod tokens;
pub mod usage;
