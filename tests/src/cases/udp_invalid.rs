use crate::support::*;

pub fn test() {
    let mut server = server::udp();
    let mut sock = udp::sock();

    sock.send(dgrams![
        ..bytes(b"not json!"),
        ..bytes(b"[\"not\", \"an\", \"object\"]")
    ]);

    assert_eq!(0, server.received());

    sock.send(dgrams![
        ..dgrams!({
            "host": "foo",
            "short_message": "bar"
        })
    ]);

    server.receive(|received| {
        assert_eq!("bar", received.record["short_message"]);
    });

    assert_eq!(1, server.received());
    assert_eq!(2, server.dropped());

    server.close();
}
