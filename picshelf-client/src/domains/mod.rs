pub mod gallery;
pub mod preview;
pub mod ui;
pub mod upload;
