pub mod notices;

pub use notices::{Notice, NoticeLevel, Notifier};
