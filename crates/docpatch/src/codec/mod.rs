//! Wire codecs for patch operations and events.

pub mod json;
