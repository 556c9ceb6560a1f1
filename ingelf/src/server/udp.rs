use std::net::SocketAddr;

use crate::diagnostics::*;

use anyhow::Error;

use bytes::{
    Bytes,
    BytesMut,
};

use futures::Stream;

use tokio::net::UdpSocket;

use tokio_util::{
    codec::Decoder,
    udp::UdpFramed,
};

pub(super) struct Server(UdpSocket);

impl Server {
    pub(super) async fn bind(addr: &SocketAddr) -> Result<Self, Error> {
        let sock = UdpSocket::bind(&addr).await?;

        Ok(Server(sock))
    }

    pub(super) fn build(self) -> impl Stream<Item = Result<(Bytes, SocketAddr), Error>> {
        emit("Setting up for UDP");

        UdpFramed::new(self.0, Decode)
    }
}

struct Decode;

impl Decoder for Decode {
    type Item = Bytes;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // All datagrams are considered a complete message
        let src = src.split_to(src.len()).freeze();

        if src.is_empty() {
            // As per the contract of `Decoder`, we return `None`
            // here to indicate more data is needed to complete a frame
            return Ok(None);
        }

        Ok(Some(src))
    }
}
