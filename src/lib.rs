#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod debounce;
pub use debounce::*;

mod policy;
pub use policy::*;

mod timer;
pub use timer::*;

mod clock;
pub use clock::ManualClock;

mod runtime;
pub use runtime::*;

pub mod store;
pub use store::{QueryCriteria, Record, RecordStore};

mod error;
pub use error::*;

#[cfg(test)]
mod tests;
