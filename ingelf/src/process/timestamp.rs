use std::time::{
    SystemTime,
    UNIX_EPOCH,
};

use serde::ser::{
    Serialize,
    Serializer,
};

use serde_json::Value;

/**
The time of an event, in seconds since the Unix epoch.

The fractional part is sub-second precision. Values before the epoch are negative.
*/
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Timestamp(f64);

impl Timestamp {
    pub fn from_secs_f64(secs: f64) -> Self {
        Timestamp(secs)
    }

    pub fn from_system_time(ts: SystemTime) -> Self {
        match ts.duration_since(UNIX_EPOCH) {
            Ok(since) => Timestamp(since.as_secs_f64()),
            Err(before) => Timestamp(-before.duration().as_secs_f64()),
        }
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0
    }

    /**
    Drop the sub-second part of the timestamp, rounding towards zero.
    */
    pub fn trunc(self) -> Self {
        Timestamp(self.0.trunc())
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.0)
    }
}

/**
The raw `timestamp` field of a GELF message.
*/
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimestampInput<'a> {
    Absent,
    Number(f64),
    Text(&'a str),
}

impl<'a> TimestampInput<'a> {
    /**
    Classify a JSON value.

    Values that are neither numbers nor strings are treated as absent, and so are
    numbers too large to fit in an `f64`.
    */
    pub fn from_value(value: Option<&'a Value>) -> Self {
        match value {
            Some(Value::Number(n)) => n
                .as_f64()
                .filter(|n| n.is_finite())
                .map(TimestampInput::Number)
                .unwrap_or(TimestampInput::Absent),
            Some(Value::String(s)) => TimestampInput::Text(s),
            _ => TimestampInput::Absent,
        }
    }
}

/**
How much to trust the timestamps sent by clients.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    /**
    Whether to use the client's timestamp at all.
    */
    pub trust_client: bool,
    /**
    Whether to drop the sub-second part of the client's timestamp.
    */
    pub truncate_client: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Policy {
            trust_client: true,
            truncate_client: false,
        }
    }
}

/**
Resolve the time of an event.

The time the message was received is used if the client can't be trusted, or
doesn't send a timestamp. Anything else the client sends is used as given, even
if it's negative or wildly in the future. Strings are coerced leniently with
[`coerce`], so a nonsensical string results in a nonsensical time rather than an error.
*/
pub fn resolve(input: TimestampInput, received_at: Timestamp, policy: Policy) -> Timestamp {
    if !policy.trust_client {
        return received_at;
    }

    let ts = match input {
        TimestampInput::Absent => return received_at,
        TimestampInput::Number(secs) => Timestamp::from_secs_f64(secs),
        TimestampInput::Text(secs) => Timestamp::from_secs_f64(coerce(secs)),
    };

    if policy.truncate_client {
        ts.trunc()
    } else {
        ts
    }
}

/**
Leniently convert a string into a number.

The longest numeric prefix of the string is used, after skipping any leading whitespace.
Underscores between digits are ignored. If there's no numeric prefix at all then
the result is `0`. This never fails.
*/
pub fn coerce(s: &str) -> f64 {
    let s = s.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == '\x0b');
    let src = s.as_bytes();

    let mut i = 0;
    let mut num = String::with_capacity(src.len());

    if let Some(&sign @ (b'+' | b'-')) = src.get(i) {
        num.push(sign as char);
        i += 1;
    }

    let mut digits = scan_digits(src, &mut i, &mut num);

    // A trailing `.` with no digits after it isn't part of the number
    if src.get(i) == Some(&b'.') && src.get(i + 1).map_or(false, u8::is_ascii_digit) {
        num.push('.');
        i += 1;

        digits += scan_digits(src, &mut i, &mut num);
    }

    if digits == 0 {
        return 0.0;
    }

    if let Some(b'e' | b'E') = src.get(i) {
        let mut j = i + 1;
        let mut exp = String::from("e");

        if let Some(&sign @ (b'+' | b'-')) = src.get(j) {
            exp.push(sign as char);
            j += 1;
        }

        // An exponent with no digits isn't part of the number
        if scan_digits(src, &mut j, &mut exp) > 0 {
            num.push_str(&exp);
        }
    }

    num.parse().unwrap_or(0.0)
}

fn scan_digits(src: &[u8], i: &mut usize, into: &mut String) -> usize {
    let mut count = 0;

    while let Some(&b) = src.get(*i) {
        if b.is_ascii_digit() {
            into.push(b as char);
            count += 1;
            *i += 1;
        } else if b == b'_' && count > 0 && src.get(*i + 1).map_or(false, u8::is_ascii_digit) {
            *i += 1;
        } else {
            break;
        }
    }

    count
}
