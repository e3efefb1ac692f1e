pub mod logs;
pub mod tick;
