use std::{
    net::SocketAddr,
    time::SystemTime,
};

use bytes::Bytes;

/**
A raw GELF datagram.

The datagram is captured along with the time it was received. That time is used as
the event's timestamp whenever the client's own timestamp can't be used.
This type won't attempt to validate that its contents conform to the GELF specification.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram {
    bytes: Bytes,
    received_at: SystemTime,
    source: Option<SocketAddr>,
}

impl Datagram {
    /**
    Capture a datagram that has just been received.
    */
    pub fn new(bytes: impl Into<Bytes>, source: Option<SocketAddr>) -> Self {
        Datagram::received_at(bytes, SystemTime::now(), source)
    }

    /**
    Capture a datagram that was received at a known point in time.
    */
    pub fn received_at(
        bytes: impl Into<Bytes>,
        received_at: SystemTime,
        source: Option<SocketAddr>,
    ) -> Self {
        Datagram {
            bytes: bytes.into(),
            received_at,
            source,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn receipt(&self) -> SystemTime {
        self.received_at
    }

    pub fn source(&self) -> Option<SocketAddr> {
        self.source
    }
}
