//! the test_utils folder here shares stubs and builders between the unit
//! tests of every module
mod common;
mod mock_type_config;
mod recording_sink;
mod stub_source;

pub use common::*;
pub use mock_type_config::*;
pub use recording_sink::*;
pub use stub_source::*;
