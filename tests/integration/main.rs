//! HTTP integration tests driving the full router in-process.

mod helpers;

mod convert_test;
mod download_test;
mod pages_test;
mod stats_test;
