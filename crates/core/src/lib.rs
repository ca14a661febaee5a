//! Domain core for a Japanese-learning spaced-repetition app: the SM-2
//! scheduler, the progress/item/answer model, and gamification formulas.
//!
//! This crate is pure computation; persistence lives in `kioku-storage` and
//! orchestration in `kioku-services`.

#![forbid(unsafe_code)]

pub mod error;
pub mod gamification;
pub mod model;
pub mod scheduler;
pub mod time;

pub use error::Error;
pub use time::Clock;
