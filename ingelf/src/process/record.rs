use serde_json::{
    Map,
    Value,
};

/**
The fields of an emitted event.

Fields keep the order they appeared in within the original message.
*/
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /**
    Whether to remove a single leading `_` from field names.
    */
    pub strip_leading_underscore: bool,
    /**
    Whether to drop the `timestamp` field.
    */
    pub remove_timestamp: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            strip_leading_underscore: true,
            remove_timestamp: true,
        }
    }
}

/**
Build a record from the top-level fields of a GELF message.

GELF prefixes additional fields with `_`. At most one leading `_` is stripped, so
`__field` becomes `_field`. Nested values are left alone.

If stripping a field name makes it collide with another field then the one that
appears later in the message wins.
*/
pub fn normalize(message: Map<String, Value>, options: Options) -> Record {
    let mut record = Record::with_capacity(message.len());

    for (k, v) in message {
        // `timestamp` is checked before stripping, so `_timestamp` is kept
        if options.remove_timestamp && k == "timestamp" {
            continue;
        }

        let k = if options.strip_leading_underscore {
            strip_leading_underscore(k)
        } else {
            k
        };

        record.insert(k, v);
    }

    record
}

fn strip_leading_underscore(mut k: String) -> String {
    if k.starts_with('_') {
        k.remove(0);
    }

    k
}
