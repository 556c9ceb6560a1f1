use std::net::{
    IpAddr,
    SocketAddr,
};

use futures::{
    future::BoxFuture,
    select,
    FutureExt,
    StreamExt,
};

use tokio::{
    runtime::Runtime,
    signal::ctrl_c,
    sync::oneshot,
};

use anyhow::Error;

use bytes::Bytes;

use crate::diagnostics::*;

mod udp;

metrics! {
    receive_ok,
    receive_err,
    process_ok,
    process_err
}

/**
Server configuration.
*/
#[derive(Debug, Clone)]
pub struct Config {
    /**
    The IPv4 or IPv6 address to bind the server to.
    */
    pub bind: String,
    /**
    The UDP port to receive datagrams on.
    */
    pub port: u16,
}

impl Config {
    /**
    The socket address to bind the server to.
    */
    pub fn addr(&self) -> Result<SocketAddr, Error> {
        let ip: IpAddr = self
            .bind
            .parse()
            .map_err(|e| anyhow!("invalid bind address {:?}: {}", self.bind, e))?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind: "0.0.0.0".to_owned(),
            port: 12201,
        }
    }
}

/**
A GELF server.
*/
pub struct Server {
    fut: BoxFuture<'static, Result<(), Error>>,
    handle: Option<Handle>,
}

impl Server {
    pub fn take_handle(&mut self) -> Option<Handle> {
        self.handle.take()
    }

    /**
    Run the server until it's closed.

    Errors binding the socket are returned here.
    */
    pub fn run(self) -> Result<(), Error> {
        // Run the server on a fresh runtime
        // We attempt to shut this runtime down cleanly to release
        // any used resources
        let runtime = Runtime::new()?;

        runtime.block_on(self.fut)
    }
}

/**
A handle to a running GELF server that can be used to interact with it
programmatically.
*/
pub struct Handle {
    close: oneshot::Sender<()>,
}

impl Handle {
    /**
    Close the server.
    */
    pub fn close(self) -> bool {
        self.close.send(()).is_ok()
    }
}

/**
Build a server to receive GELF datagrams and process them.

Each datagram is passed to `process` along with the address it was sent from.
An error processing one datagram is reported, but doesn't stop the server.
*/
pub fn build(
    config: Config,
    mut process: impl FnMut(Bytes, SocketAddr) -> Result<(), Error> + Send + 'static,
) -> Result<Server, Error> {
    emit("Starting GELF server");

    let addr = config.addr()?;
    let (handle_tx, handle_rx) = oneshot::channel();

    // Build a handle
    let handle = Some(Handle { close: handle_tx });

    let server = async move {
        let incoming = udp::Server::bind(&addr).await?.build();

        let mut close = handle_rx.fuse();
        let mut ctrl_c = ctrl_c().boxed().fuse();
        let mut incoming = Box::pin(incoming).fuse();

        // NOTE: We don't use `?` here because we never want to carry results
        // We always want to match them and deal with error cases directly
        loop {
            select! {
                // A datagram that's ready to process
                dgram = incoming.next() => match dgram {
                    Some(Ok((dgram, source))) => {
                        increment!(server.receive_ok);

                        match process(dgram, source) {
                            Ok(()) => {
                                increment!(server.process_ok);
                            }
                            Err(err) => {
                                increment!(server.process_err);
                                emit_err(&err, "GELF processing failed");
                            }
                        }
                    },
                    // An error receiving a datagram, such as a connection reset
                    // reported by the OS for a previous send. The socket is still usable
                    Some(Err(err)) => {
                        increment!(server.receive_err);
                        emit_err(&err, "GELF receiving failed");
                        continue;
                    },
                    None => {
                        emit("UDP socket closed");
                        break;
                    },
                },
                // A termination signal from the programmatic handle
                _ = close => {
                    emit("Handle closed; shutting down");
                    break;
                },
                // A termination signal from the environment
                _ = ctrl_c => {
                    emit("Termination signal received; shutting down");
                    break;
                },
            };
        }

        emit("Stopping GELF server");

        Result::Ok::<(), Error>(())
    };

    Ok(Server {
        fut: Box::pin(server),
        handle,
    })
}
