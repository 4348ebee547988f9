//! Reminder queueing and firing

pub mod service;

pub use service::ReminderService;
