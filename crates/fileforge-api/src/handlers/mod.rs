//! Route handlers organized by concern.

pub mod convert;
pub mod download;
pub mod health;
pub mod pages;
pub mod stats;
pub mod tools;
