pub mod notices;
pub mod ui;
