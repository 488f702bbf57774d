pub mod countdown;
pub mod debug_mode;
pub mod input;
pub mod time;
