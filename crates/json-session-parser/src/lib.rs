//! Parses a JSON document and calls callbacks on a [`JsonSessionObserver`].
//!
//! Each callback answers with a [`Flow`]. Returning [`Flow::Stop`] ends the parse right
//! away, without tokenizing the rest of the input.

mod parser;

pub use parser::*;
