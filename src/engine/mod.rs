// Encoding engine - independent of the CLI front-end

pub mod core;
pub mod worker;

pub use core::*;
pub use worker::{EncodeHandle, EncodeWorker, WorkerMessage};
