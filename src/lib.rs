//! Replays an ICPC contest event stream and keeps a live, strictly ordered
//! scoreboard, including the freeze window and the one-problem-at-a-time
//! scroll that unveils frozen results.

pub mod error;
pub mod logging;
pub mod models;
pub mod services;
