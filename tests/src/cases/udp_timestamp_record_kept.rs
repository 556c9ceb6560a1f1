use crate::support::*;

pub fn test() {
    let mut server = server::builder().remove_timestamp_record(false).udp();
    let mut sock = udp::sock();

    sock.send(dgrams![
        ..dgrams!({
            "short_message": "short message",
            "timestamp": "1234567890.1234"
        })
    ]);

    server.receive(|received| {
        assert_eq!(1234567890.1234, received.time);
        assert_eq!("1234567890.1234", received.record["timestamp"]);
    });

    server.close();
}
