//! Property tests for envelope fidelity and flush ordering.

use proptest::prelude::*;
use serde_json::{Value, json};
use socket_channels::transport::MemoryTransport;
use socket_channels::{Client, ClientOptions, Envelope};

fn channel_name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_.:-]{0,15}"
}

fn payload() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[ -~]{0,12}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

fn client(auto_start: bool) -> (Client, MemoryTransport) {
    let transport = MemoryTransport::new();
    let options = ClientOptions::default()
        .with_auto_start(auto_start)
        .with_transport(transport.clone());
    let client = Client::open("localhost", 9000, options).expect("open");
    (client, transport)
}

proptest! {
    #[test]
    fn prop_connected_send_is_one_faithful_envelope(channel in channel_name(), data in payload()) {
        let (client, transport) = client(true);
        transport.open();

        client.send(&channel, &data).expect("send");

        let sent = transport.sent();
        prop_assert_eq!(sent.len(), 1);
        let envelope = Envelope::decode(&sent[0]).expect("decode");
        prop_assert_eq!(envelope.channel.as_str(), channel.as_str());
        prop_assert_eq!(envelope.data, data);
    }

    #[test]
    fn prop_flush_preserves_issue_order(
        messages in prop::collection::vec((channel_name(), any::<u32>()), 0..20),
        deferred in any::<bool>(),
    ) {
        // Either never started (Disconnected) or still Connecting.
        let (client, transport) = client(!deferred);
        for (channel, n) in &messages {
            client.send(channel, n).expect("send");
        }
        if deferred {
            client.start().expect("start");
        }
        transport.open();

        let observed: Vec<(String, Value)> = transport
            .sent()
            .iter()
            .map(|text| {
                let envelope = Envelope::decode(text).expect("decode");
                (envelope.channel.to_string(), envelope.data)
            })
            .collect();
        let expected: Vec<(String, Value)> = messages
            .iter()
            .map(|(channel, n)| (channel.clone(), json!(n)))
            .collect();

        prop_assert_eq!(observed, expected);
        prop_assert_eq!(client.buffered_len(), 0);
    }

    #[test]
    fn prop_release_reports_prior_registration(channel in channel_name(), register in any::<bool>()) {
        let (client, _transport) = client(false);
        if register {
            client.on(&channel, |_| {}).expect("on");
        }
        prop_assert_eq!(client.release(&channel), register);
        prop_assert!(!client.is_registered(&channel));
    }

    #[test]
    fn prop_arbitrary_inbound_text_never_disturbs_status(text in ".{0,64}") {
        let (client, transport) = client(true);
        transport.open();
        client.on("null", |_| {}).expect("on");

        transport.deliver(text);

        prop_assert_eq!(client.status(), socket_channels::Status::Connected);
    }
}
