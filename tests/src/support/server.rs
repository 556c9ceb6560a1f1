use std::{
    sync::{
        Arc,
        Mutex,
    },
    thread,
    time::Duration,
};

use crossbeam_channel::{
    self,
    Receiver,
};

use serde_json::Value;

use ingelf::{
    dispatch::{
        Dispatcher,
        Outcome,
    },
    process::{
        self,
        record::Record,
        timestamp::Timestamp,
    },
    server,
    Error,
};

use super::{
    SERVER_BIND,
    SERVER_PORT,
};

/**
An event received by the test server.
*/
#[derive(Debug)]
pub struct Received {
    pub tag: String,
    pub time: f64,
    pub record: Value,
}

pub struct Builder {
    process: process::Config,
}

impl Builder {
    fn new() -> Self {
        Builder {
            process: Default::default(),
        }
    }

    pub fn tag(mut self, v: &str) -> Self {
        self.process.tag = v.to_owned();
        self
    }

    pub fn trust_client_timestamp(mut self, v: bool) -> Self {
        self.process.trust_client_timestamp = v;
        self
    }

    pub fn client_timestamp_to_i(mut self, v: bool) -> Self {
        self.process.client_timestamp_to_i = v;
        self
    }

    pub fn remove_timestamp_record(mut self, v: bool) -> Self {
        self.process.remove_timestamp_record = v;
        self
    }

    pub fn strip_leading_underscore(mut self, v: bool) -> Self {
        self.process.strip_leading_underscore = v;
        self
    }

    pub fn udp(self) -> Server {
        Server::new(
            server::Config {
                bind: SERVER_BIND.into(),
                port: SERVER_PORT,
            },
            self.process,
        )
    }
}

pub struct Server {
    server: thread::JoinHandle<()>,
    handle: server::Handle,
    received: Arc<Mutex<usize>>,
    dropped: Arc<Mutex<usize>>,
    rx: Receiver<Received>,
}

pub fn builder() -> Builder {
    Builder::new()
}

pub fn udp() -> Server {
    Builder::new().udp()
}

impl Server {
    fn new(config: server::Config, process_config: process::Config) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        let received = Arc::new(Mutex::new(0));
        let dropped = Arc::new(Mutex::new(0));

        let dispatcher = Dispatcher::new(process::build(process_config), {
            let received = received.clone();

            move |tag: &str, time: Timestamp, record: Record| -> Result<(), Error> {
                *(received.lock().expect("poisoned lock")) += 1;

                tx.send(Received {
                    tag: tag.to_owned(),
                    time: time.as_secs_f64(),
                    record: Value::Object(record),
                })?;

                Ok(())
            }
        });

        let mut server = server::build(config, {
            let dropped = dropped.clone();

            move |dgram, source| {
                let outcome = dispatcher.receive(dgram, Some(source));

                if let Outcome::Dropped(_) = outcome {
                    *(dropped.lock().expect("poisoned lock")) += 1;
                }

                outcome.into_result()
            }
        })
        .expect("failed to build server");

        let handle = server.take_handle().expect("no server handle");
        let server = thread::spawn(move || server.run().expect("failed to run server"));

        // Wait for the server to become available
        thread::sleep(Duration::from_secs(1));

        Server {
            handle,
            server,
            rx,
            received,
            dropped,
        }
    }

    pub fn received(&mut self) -> usize {
        *(self.received.lock().expect("poisoned lock"))
    }

    pub fn dropped(&mut self) -> usize {
        *(self.dropped.lock().expect("poisoned lock"))
    }

    pub fn receive(&mut self, f: impl FnOnce(Received)) {
        let msg = self
            .rx
            .recv_timeout(Duration::from_secs(3))
            .expect("failed to receive a message");

        f(msg)
    }

    pub fn close(self) {
        self.handle.close();
        self.server.join().expect("failed to run server");
    }
}
