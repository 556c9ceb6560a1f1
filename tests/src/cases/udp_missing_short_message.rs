use crate::support::*;

pub fn test() {
    let mut server = server::udp();
    let mut sock = udp::sock();

    sock.send(dgrams![
        ..dgrams!({
            "host": "foo",
            "_user_id": 9001
        })
    ]);

    server.receive(|received| {
        assert_eq!(json!({ "host": "foo", "user_id": 9001 }), received.record);
    });

    server.close();
}
