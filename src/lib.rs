#![allow(dead_code)]

pub mod app_config;
pub mod error;
pub mod job;
pub mod notify;
pub mod sync;
pub mod time_util;
