//! Message framing shared by requests and replies
//!
//! A message is a 20-byte [`MessageHeader`], a 20-byte template
//! ([`RequestTemplate`] or [`ReplyTemplate`]) and zero or more
//! codepoint-tagged parameters.

mod header;
pub mod parameter;
mod template;

pub use header::MessageHeader;
pub use parameter::{Parameter, ParameterList, ParameterValue, RawParameter};
pub use template::{ReplyTemplate, RequestTemplate};
