pub mod app;
pub mod core;
pub mod lookup;
pub mod notifications;
pub mod scanner;
