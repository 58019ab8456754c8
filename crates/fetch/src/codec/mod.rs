//! Encoding and decoding concerns of the client.
//!
//! Two directions live here:
//!
//! - Outgoing: [`query_encoder`] percent-encodes query parameters and form
//!   bodies on the submitting thread, before a request ever reaches the
//!   reactor.
//! - Incoming: [`ResponseCollector`] assembles raw header lines and body
//!   chunks delivered by the transfer engine into a finished
//!   [`Response`](crate::protocol::Response).
//!
//! Wire-level HTTP parsing and framing belong to the transfer engine, not to
//! this crate.

pub mod query_encoder;

mod response_collector;
pub use response_collector::ResponseCollector;
