use std::time::SystemTime;

use ingelf::process::timestamp::Timestamp;

use crate::support::*;

pub fn test() {
    let mut server = server::builder().trust_client_timestamp(false).udp();
    let mut sock = udp::sock();

    let before = Timestamp::from_system_time(SystemTime::now()).as_secs_f64();

    sock.send(dgrams![
        ..dgrams!({
            "short_message": "short message",
            "timestamp": 1234567890.1234
        })
    ]);

    server.receive(|received| {
        let after = Timestamp::from_system_time(SystemTime::now()).as_secs_f64();

        assert_ne!(1234567890.1234, received.time);
        assert!(received.time >= before);
        assert!(received.time <= after);
    });

    server.close();
}
