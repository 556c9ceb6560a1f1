pub mod record;
pub mod timestamp;

use std::{
    error,
    fmt,
    sync::Arc,
};

use serde_json::Value;

use self::{
    record::Record,
    timestamp::{
        Timestamp,
        TimestampInput,
    },
};

use crate::{
    diagnostics::*,
    receive::Datagram,
};

metrics! {
    msg,
    malformed,
    missing_short_message
}

/**
Configuration for decoding GELF messages.
*/
#[derive(Debug, Clone)]
pub struct Config {
    /**
    The tag attached to every event.
    */
    pub tag: String,
    /**
    Whether or not to use the timestamp sent by the client as the time of the event.

    If this is `false` then the time the message was received is used instead.
    */
    pub trust_client_timestamp: bool,
    /**
    Whether or not to drop the sub-second part of the timestamp sent by the client.
    */
    pub client_timestamp_to_i: bool,
    /**
    Whether or not to remove the `timestamp` field from the record once it's been
    used as the time of the event.
    */
    pub remove_timestamp_record: bool,
    /**
    Whether or not to remove a leading `_` from additional field names.
    */
    pub strip_leading_underscore: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tag: "gelf".to_owned(),
            trust_client_timestamp: true,
            client_timestamp_to_i: false,
            remove_timestamp_record: true,
            strip_leading_underscore: true,
        }
    }
}

/**
Build a GELF processor to decode messages.
*/
pub fn build(config: Config) -> Process {
    Process::new(config)
}

/**
Decode raw GELF datagrams into events.

Decoding doesn't depend on any previously decoded datagram, so a single `Process`
can be shared between threads.
*/
#[derive(Debug, Clone)]
pub struct Process {
    tag: Arc<str>,
    timestamp: timestamp::Policy,
    record: record::Options,
}

impl Process {
    pub fn new(config: Config) -> Self {
        Process {
            tag: config.tag.into(),
            timestamp: timestamp::Policy {
                trust_client: config.trust_client_timestamp,
                truncate_client: config.client_timestamp_to_i,
            },
            record: record::Options {
                strip_leading_underscore: config.strip_leading_underscore,
                remove_timestamp: config.remove_timestamp_record,
            },
        }
    }

    /**
    Decode a GELF datagram into an event.

    A datagram that isn't a JSON object is rejected. Anything else produces an event,
    including messages without a `short_message`, or with a `timestamp` that doesn't
    make sense.
    */
    pub fn decode(&self, datagram: &Datagram) -> Result<Event, DecodeFailure> {
        increment!(process.msg);

        let bytes = datagram.bytes();

        let message = match serde_json::from_slice(bytes) {
            Ok(Value::Object(message)) => message,
            Ok(_) => {
                increment!(process.malformed);
                return Err(DecodeFailure::new(DecodeFailureKind::NotAnObject, bytes));
            }
            Err(err) => {
                increment!(process.malformed);
                return Err(DecodeFailure::new(
                    DecodeFailureKind::MalformedPayload(err.to_string()),
                    bytes,
                ));
            }
        };

        if !message.contains_key("short_message") {
            increment!(process.missing_short_message);
            emit_debug(
                "GELF message is missing a short_message",
                datagram.source().map(|source| ("source", Value::String(source.to_string()))),
            );
        }

        let time = timestamp::resolve(
            TimestampInput::from_value(message.get("timestamp")),
            Timestamp::from_system_time(datagram.receipt()),
            self.timestamp,
        );

        let record = record::normalize(message, self.record);

        Ok(Event {
            tag: self.tag.clone(),
            time,
            record,
        })
    }
}

/**
A decoded GELF message.
*/
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    tag: Arc<str>,
    time: Timestamp,
    record: Record,
}

impl Event {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn time(&self) -> Timestamp {
        self.time
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn into_parts(self) -> (Arc<str>, Timestamp, Record) {
        (self.tag, self.time, self.record)
    }
}

/**
A datagram that couldn't be decoded.

The datagram is dropped.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeFailure {
    kind: DecodeFailureKind,
    preview: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeFailureKind {
    /**
    The datagram isn't valid JSON.
    */
    MalformedPayload(String),
    /**
    The datagram is valid JSON, but not an object.
    */
    NotAnObject,
}

impl DecodeFailure {
    // Enough of the payload to recognize it without flooding diagnostics
    const MAX_PREVIEW_CHARS: usize = 256;

    fn new(kind: DecodeFailureKind, bytes: &[u8]) -> Self {
        let payload = String::from_utf8_lossy(bytes);

        let preview = match payload.char_indices().nth(Self::MAX_PREVIEW_CHARS) {
            Some((end, _)) => format!("{}...", &payload[..end]),
            None => payload.into_owned(),
        };

        DecodeFailure { kind, preview }
    }

    pub fn kind(&self) -> &DecodeFailureKind {
        &self.kind
    }
}

impl fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            DecodeFailureKind::MalformedPayload(err) => {
                write!(f, "could not parse GELF from: {:?} ({})", self.preview, err)
            }
            DecodeFailureKind::NotAnObject => {
                write!(f, "expected a GELF object, but got: {:?}", self.preview)
            }
        }
    }
}

impl error::Error for DecodeFailure {}
