//! Progressive reveal of agent reasoning traces

mod stream;

pub use stream::ThoughtStream;
