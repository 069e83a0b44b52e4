pub mod pagination;
pub mod text;
pub mod time;
