pub mod args;
pub mod font;
pub mod layout;
pub mod render;
