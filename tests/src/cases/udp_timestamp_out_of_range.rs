use std::time::SystemTime;

use ingelf::process::timestamp::Timestamp;

use crate::support::*;

pub fn test() {
    let mut server = server::udp();
    let mut sock = udp::sock();

    let before = Timestamp::from_system_time(SystemTime::now()).as_secs_f64();

    sock.send(dgrams![
        ..bytes(b"{\"short_message\":\"m\",\"timestamp\":1e400}"),
        ..bytes(b"{\"short_message\":\"n\",\"_big\":1e400}")
    ]);

    server.receive(|received| {
        let after = Timestamp::from_system_time(SystemTime::now()).as_secs_f64();

        assert_eq!("m", received.record["short_message"]);
        assert!(received.time >= before);
        assert!(received.time <= after);
    });

    server.receive(|received| {
        assert_eq!("n", received.record["short_message"]);
        assert_eq!("1e400", received.record["big"].to_string());
    });

    assert_eq!(2, server.received());
    assert_eq!(0, server.dropped());

    server.close();
}
