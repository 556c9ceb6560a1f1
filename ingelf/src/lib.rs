/*!
A lightweight GELF input that receives GELF over UDP and emits structured events.

The input is split into a few main components, in order of where they appear in the processing of a log event:

- **Server**: An asynchronous UDP server built on `tokio` that handles the network.
- **Dispatch**: Stamps each datagram with the time it was received, decodes it, and hands the
resulting event to an `Emit` sink. A datagram that can't be decoded never affects any other.
- **Process**: Deserializes GELF messages and maps them into events. This is where the event's
timestamp is resolved, and where any transformations over field names are made.
*/

#![recursion_limit = "256"]
#![deny(unsafe_code)]

#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate serde_derive;

#[macro_use]
extern crate anyhow;

#[macro_use]
pub mod diagnostics;

pub mod config;
pub mod dispatch;
pub mod process;
pub mod receive;
pub mod server;

pub use self::{anyhow::Error, config::Config};
