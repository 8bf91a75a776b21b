// creature-notifier: distance, ignore-list and schedule filtered creature alerts

pub mod app;
pub mod core;
