/*!
Route decoded datagrams to wherever events are emitted.

Each datagram is handled on its own: one that can't be decoded, or can't be emitted,
has no effect on any other.
*/

use std::{
    io::{
        self,
        Write,
    },
    net::SocketAddr,
};

use bytes::Bytes;

use crate::{
    process::{
        record::Record,
        timestamp::Timestamp,
        DecodeFailure,
        Process,
    },
    receive::Datagram,
    Error,
};

metrics! {
    received,
    emitted,
    dropped,
    failed
}

/**
A destination for events.
*/
pub trait Emit {
    fn emit(&self, tag: &str, time: Timestamp, record: Record) -> Result<(), Error>;
}

impl<F> Emit for F
where
    F: Fn(&str, Timestamp, Record) -> Result<(), Error>,
{
    fn emit(&self, tag: &str, time: Timestamp, record: Record) -> Result<(), Error> {
        (self)(tag, time, record)
    }
}

/**
Write events to `stdout` as JSON, one per line.
*/
#[derive(Debug, Clone, Copy, Default)]
pub struct Stdout;

#[derive(Serialize)]
struct StdoutEvent<'a> {
    tag: &'a str,
    time: Timestamp,
    record: &'a Record,
}

impl Emit for Stdout {
    fn emit(&self, tag: &str, time: Timestamp, record: Record) -> Result<(), Error> {
        let evt = StdoutEvent {
            tag,
            time,
            record: &record,
        };

        let json = serde_json::to_string(&evt)?;

        let stdout = io::stdout();
        let mut stdout = stdout.lock();
        writeln!(stdout, "{}", json)?;

        Ok(())
    }
}

/**
What happened to a datagram.
*/
#[derive(Debug)]
pub enum Outcome {
    /**
    The datagram was decoded and emitted.
    */
    Emitted,
    /**
    The datagram couldn't be decoded, so was dropped.
    */
    Dropped(DecodeFailure),
    /**
    The datagram was decoded, but couldn't be emitted.
    */
    Failed(Error),
}

impl Outcome {
    pub fn is_emitted(&self) -> bool {
        matches!(self, Outcome::Emitted)
    }

    /**
    Convert the outcome into a result that's only `Ok` if an event was emitted.
    */
    pub fn into_result(self) -> Result<(), Error> {
        match self {
            Outcome::Emitted => Ok(()),
            Outcome::Dropped(failure) => {
                Err(Error::new(failure).context("GELF datagram was dropped"))
            }
            Outcome::Failed(err) => Err(err.context("GELF event could not be emitted")),
        }
    }
}

/**
Decode datagrams and send the results to an `Emit`.
*/
#[derive(Debug, Clone)]
pub struct Dispatcher<E> {
    process: Process,
    sink: E,
}

impl<E> Dispatcher<E>
where
    E: Emit,
{
    pub fn new(process: Process, sink: E) -> Self {
        Dispatcher { process, sink }
    }

    /**
    Handle a datagram that has just arrived.

    The current time is captured as the time the datagram was received.
    */
    pub fn receive(&self, bytes: Bytes, source: Option<SocketAddr>) -> Outcome {
        self.dispatch(Datagram::new(bytes, source))
    }

    /**
    Decode a datagram and emit it.
    */
    pub fn dispatch(&self, datagram: Datagram) -> Outcome {
        increment!(dispatch.received);

        let (tag, time, record) = match self.process.decode(&datagram) {
            Ok(event) => event.into_parts(),
            Err(failure) => {
                increment!(dispatch.dropped);

                return Outcome::Dropped(failure);
            }
        };

        match self.sink.emit(&tag, time, record) {
            Ok(()) => {
                increment!(dispatch.emitted);

                Outcome::Emitted
            }
            Err(err) => {
                increment!(dispatch.failed);

                Outcome::Failed(err)
            }
        }
    }
}
