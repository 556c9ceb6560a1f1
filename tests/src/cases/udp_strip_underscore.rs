use crate::support::*;

pub fn test() {
    let mut server = server::udp();
    let mut sock = udp::sock();

    sock.send(dgrams![
        ..dgrams!({
            "timestamp": 12345,
            "short_message": "short message",
            "full_message": "full message",
            "_custom_field_one": 12345,
            "__custom_field_two": "x"
        })
    ]);

    server.receive(|received| {
        let expected = json!({
            "short_message": "short message",
            "full_message": "full message",
            "custom_field_one": 12345,
            "_custom_field_two": "x"
        });

        assert_eq!(12345.0, received.time);
        assert_eq!(expected, received.record);
    });

    server.close();
}
