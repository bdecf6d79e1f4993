pub mod config;
pub mod logging;

pub mod camera;
pub mod clip;
pub mod control;
pub mod error;
pub mod locator;
pub mod naming;
pub mod orchestrator;
pub mod progress;
pub mod retry;
pub mod run;
pub mod storage;
pub mod time_range;

mod pool;
