use crate::support::*;

pub fn test() {
    let mut server = server::builder().client_timestamp_to_i(true).udp();
    let mut sock = udp::sock();

    sock.send(dgrams![
        ..dgrams!({
            "short_message": "short message",
            "timestamp": 1234567890.1234
        })
    ]);

    server.receive(|received| {
        assert_eq!(1234567890.0, received.time);
    });

    server.close();
}
