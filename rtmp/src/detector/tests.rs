use super::*;
use crate::handshake::{HandshakeState, HANDSHAKE_PACKET_SIZE};
use crate::test_utils::fixtures::{
    chunk_message, command_body, connect_message, random_bytes, string, CONNECT_CSID,
};
use rml_amf0_scan::Amf0Value;

const FLOW: u32 = 7;
const SWF_URL: &str = "http://x/y.swf";
const PAGE_URL: &str = "http://x/";
const PACKET_SIZE: usize = HANDSHAKE_PACKET_SIZE as usize;

struct TestFlow {
    detector: RtmpDetector,
    flows: FlowTable<u32>,
    packet_count: u32,
}

impl TestFlow {
    fn new(config: DetectorConfig) -> TestFlow {
        TestFlow {
            detector: RtmpDetector::new(config),
            flows: FlowTable::new(),
            packet_count: 0,
        }
    }

    fn unlimited() -> TestFlow {
        let mut config = DetectorConfig::new();
        config.max_packets = u32::max_value();
        TestFlow::new(config)
    }

    fn send(&mut self, direction: Direction, data: &[u8]) -> ServiceResult {
        self.packet_count += 1;
        let packet = Packet {
            data,
            direction,
            session_packet_count: self.packet_count,
        };

        self.detector.validate(&mut self.flows, &FLOW, &packet)
    }

    fn client(&mut self, data: &[u8]) -> ServiceResult {
        self.send(Direction::FromInitiator, data)
    }

    fn server(&mut self, data: &[u8]) -> ServiceResult {
        self.send(Direction::FromResponder, data)
    }

    /// Splits both streams into pieces of at most `size` bytes and alternates between them,
    /// starting with the client.
    fn send_interleaved(&mut self, client: &[u8], server: &[u8], size: usize) {
        let mut client_pieces = client.chunks(size);
        let mut server_pieces = server.chunks(size);

        loop {
            let client_piece = client_pieces.next();
            let server_piece = server_pieces.next();
            if client_piece.is_none() && server_piece.is_none() {
                break;
            }

            if let Some(piece) = client_piece {
                assert_eq!(self.client(piece), ServiceResult::InProgress);
            }

            if let Some(piece) = server_piece {
                assert_eq!(self.server(piece), ServiceResult::InProgress);
            }
        }
    }

    fn state(&self) -> &RtmpFlowState {
        self.flows
            .get(&FLOW)
            .and_then(|entry| entry.state.as_ref())
            .expect("Flow has no detector state")
    }

    fn http_session(&self) -> Option<&HttpSessionMetadata> {
        self.flows
            .get(&FLOW)
            .and_then(|entry| entry.http_session.as_ref())
    }
}

fn c0_and_c1() -> Vec<u8> {
    let mut bytes = vec![3];
    bytes.extend(random_bytes(PACKET_SIZE));
    bytes
}

fn s0_s1_and_s2() -> Vec<u8> {
    let mut bytes = vec![3];
    bytes.extend(random_bytes(PACKET_SIZE * 2));
    bytes
}

fn c2() -> Vec<u8> {
    random_bytes(PACKET_SIZE)
}

/// Runs a complete handshake with a connect command carrying both urls
fn run_valid_flow(flow: &mut TestFlow) -> Vec<ServiceResult> {
    vec![
        flow.client(&c0_and_c1()),
        flow.server(&s0_s1_and_s2()),
        flow.client(&c2()),
        flow.client(&connect_message(SWF_URL, PAGE_URL)),
    ]
}

#[test]
fn full_handshake_and_connect_command_identifies_flow() {
    let mut flow = TestFlow::unlimited();
    let results = run_valid_flow(&mut flow);

    assert_eq!(
        results,
        vec![
            ServiceResult::InProgress,
            ServiceResult::InProgress,
            ServiceResult::InProgress,
            ServiceResult::Success,
        ]
    );

    let expected_metadata = ConnectMetadata {
        swf_url: Some(SWF_URL.to_string()),
        page_url: Some(PAGE_URL.to_string()),
    };

    assert_eq!(
        flow.flows.outcome(&FLOW),
        Some(&FlowOutcome::Identified {
            app_id: AppId::Rtmp,
            metadata: expected_metadata,
        })
    );

    let session = flow.http_session().expect("No http session created");
    assert_eq!(session.url, Some(SWF_URL.to_string()));
    assert_eq!(session.referer, Some(PAGE_URL.to_string()));
    assert!(session.scan_host_url, "Url scan was not requested");
    assert!(flow.state().metadata().is_empty(), "Metadata was not handed off");
}

#[test]
fn whole_client_stream_can_follow_server_in_one_packet() {
    let mut flow = TestFlow::unlimited();
    let mut client_rest = c2();
    client_rest.extend(connect_message(SWF_URL, PAGE_URL));

    assert_eq!(flow.client(&c0_and_c1()), ServiceResult::InProgress);
    assert_eq!(flow.server(&s0_s1_and_s2()), ServiceResult::InProgress);
    assert_eq!(flow.client(&client_rest), ServiceResult::Success);
}

#[test]
fn server_finishing_last_identifies_flow() {
    let mut flow = TestFlow::unlimited();
    let server_bytes = s0_s1_and_s2();
    let mut client_rest = c2();
    client_rest.extend(connect_message(SWF_URL, PAGE_URL));

    assert_eq!(flow.client(&c0_and_c1()), ServiceResult::InProgress);
    assert_eq!(flow.server(&server_bytes[..1 + PACKET_SIZE]), ServiceResult::InProgress);
    assert_eq!(flow.client(&client_rest), ServiceResult::InProgress);
    assert_eq!(flow.state().client_state(), HandshakeState::Done);
    assert_eq!(flow.server(&server_bytes[1 + PACKET_SIZE..]), ServiceResult::Success);
}

#[test]
fn classification_is_the_same_for_any_split_of_the_handshake() {
    let client_first = c0_and_c1();
    let server_bytes = s0_s1_and_s2();
    let client_second = c2();
    let connect = connect_message(SWF_URL, PAGE_URL);

    for size in 1..=server_bytes.len() + 1 {
        let mut flow = TestFlow::unlimited();
        flow.send_interleaved(&client_first, &server_bytes, size);
        for piece in client_second.chunks(size) {
            assert_eq!(flow.client(piece), ServiceResult::InProgress);
        }

        assert_eq!(
            flow.state().client_state(),
            HandshakeState::SentHandshake2,
            "Unexpected client state for split size {}",
            size
        );
        assert_eq!(
            flow.state().server_state(),
            HandshakeState::Done,
            "Unexpected server state for split size {}",
            size
        );

        assert_eq!(
            flow.client(&connect),
            ServiceResult::Success,
            "Flow not identified for split size {}",
            size
        );

        let session = flow.http_session().expect("No http session created");
        assert_eq!(session.url, Some(SWF_URL.to_string()));
        assert_eq!(session.referer, Some(PAGE_URL.to_string()));
    }
}

#[test]
fn handshake_packet_budget_is_satisfied_exactly() {
    let client_first = c0_and_c1();

    // 1535 bytes then 1 byte
    let mut flow = TestFlow::unlimited();
    flow.client(&client_first[..PACKET_SIZE]);
    assert_eq!(flow.state().client_state(), HandshakeState::SendingHandshake1);
    assert_eq!(flow.state().client_bytes_left(), 1);
    flow.client(&client_first[PACKET_SIZE..]);
    assert_eq!(flow.state().client_state(), HandshakeState::SentHandshake1);

    // 1536 bytes then nothing more
    let mut flow = TestFlow::unlimited();
    flow.client(&client_first);
    assert_eq!(flow.state().client_state(), HandshakeState::SentHandshake1);
    flow.client(&[]);
    assert_eq!(flow.state().client_state(), HandshakeState::SentHandshake1);

    // 1537 bytes leaves one byte for the next packet
    let mut flow = TestFlow::unlimited();
    let server_bytes = s0_s1_and_s2();
    flow.client(&client_first);
    flow.server(&server_bytes[..1 + PACKET_SIZE + 1]);
    assert_eq!(flow.state().server_state(), HandshakeState::SendingHandshake2);
    assert_eq!(flow.state().server_bytes_left(), HANDSHAKE_PACKET_SIZE - 1);
}

#[test]
fn client_version_other_than_3_fails() {
    for &version in &[0_u8, 6, 0xf3] {
        let mut flow = TestFlow::unlimited();
        let mut bytes = c0_and_c1();
        bytes[0] = version;

        assert_eq!(flow.client(&bytes), ServiceResult::NoMatch);
        assert_eq!(flow.flows.outcome(&FLOW), Some(&FlowOutcome::Failed));
    }
}

#[test]
fn server_version_other_than_3_fails() {
    let mut flow = TestFlow::unlimited();
    let mut server_bytes = s0_s1_and_s2();
    server_bytes[0] = 6;

    flow.client(&c0_and_c1());
    assert_eq!(flow.server(&server_bytes), ServiceResult::NoMatch);
}

#[test]
fn server_sending_before_client_fails() {
    let mut flow = TestFlow::unlimited();
    assert_eq!(flow.server(&s0_s1_and_s2()), ServiceResult::NoMatch);
}

#[test]
fn client_sending_c2_before_server_sent_s1_fails() {
    let mut flow = TestFlow::unlimited();
    let server_bytes = s0_s1_and_s2();

    flow.client(&c0_and_c1());
    flow.server(&server_bytes[..PACKET_SIZE]);
    assert_eq!(flow.client(&c2()), ServiceResult::NoMatch);
}

#[test]
fn server_sending_s2_before_client_sent_c1_fails() {
    let mut flow = TestFlow::unlimited();
    let client_first = c0_and_c1();

    flow.client(&client_first[..100]);
    assert_eq!(flow.server(&s0_s1_and_s2()), ServiceResult::NoMatch);
}

#[test]
fn non_connect_command_fails() {
    let mut flow = TestFlow::unlimited();
    let body = command_body("play", vec![("swfUrl", string(SWF_URL))]);

    flow.client(&c0_and_c1());
    flow.server(&s0_s1_and_s2());
    flow.client(&c2());
    assert_eq!(
        flow.client(&chunk_message(20, CONNECT_CSID, &body)),
        ServiceResult::NoMatch
    );
    assert!(flow.http_session().is_none());
}

#[test]
fn continuation_chunk_on_wrong_stream_fails() {
    let mut flow = TestFlow::unlimited();
    let mut message = connect_message(SWF_URL, PAGE_URL);
    let continuation_index = 12 + 128;
    assert_eq!(message[continuation_index], 0b11_000000 | CONNECT_CSID);
    message[continuation_index] = 0b11_000000 | (CONNECT_CSID + 1);

    flow.client(&c0_and_c1());
    flow.server(&s0_s1_and_s2());
    flow.client(&c2());
    assert_eq!(flow.client(&message), ServiceResult::NoMatch);
}

#[test]
fn captured_values_are_released_on_failure() {
    let mut flow = TestFlow::unlimited();
    let body = command_body(
        "connect",
        vec![
            ("swfUrl", string(SWF_URL)),
            ("objectEncoding", Amf0Value::Null),
        ],
    );

    flow.client(&c0_and_c1());
    flow.server(&s0_s1_and_s2());
    flow.client(&c2());
    assert_eq!(
        flow.client(&chunk_message(20, CONNECT_CSID, &body)),
        ServiceResult::NoMatch
    );
    assert!(flow.state().metadata().is_empty());
}

#[test]
fn connect_without_urls_identifies_flow_without_session() {
    let mut flow = TestFlow::unlimited();
    let body = command_body("connect", vec![("app", string("live"))]);

    flow.client(&c0_and_c1());
    flow.server(&s0_s1_and_s2());
    flow.client(&c2());
    assert_eq!(
        flow.client(&chunk_message(20, CONNECT_CSID, &body)),
        ServiceResult::Success
    );
    assert!(flow.http_session().is_none());
}

#[test]
fn invalid_utf8_in_swf_url_is_replaced_and_flow_identified() {
    let mut flow = TestFlow::unlimited();
    let mut body = command_body("connect", vec![("swfUrl", string("http://x/?y.swf"))]);
    let position = body
        .windows(6)
        .position(|window| window == b"?y.swf")
        .unwrap();
    body[position] = 0xff;

    flow.client(&c0_and_c1());
    flow.server(&s0_s1_and_s2());
    flow.client(&c2());
    assert_eq!(
        flow.client(&chunk_message(20, CONNECT_CSID, &body)),
        ServiceResult::Success
    );

    let session = flow.http_session().expect("No http session created");
    assert_eq!(session.url, Some("http://x/\u{fffd}y.swf".to_string()));
}

#[test]
fn bytes_after_connect_command_are_ignored() {
    let mut flow = TestFlow::unlimited();
    let mut client_rest = c2();
    client_rest.extend(connect_message(SWF_URL, PAGE_URL));
    client_rest.extend(random_bytes(4000));

    flow.client(&c0_and_c1());
    flow.server(&s0_s1_and_s2());
    assert_eq!(flow.client(&client_rest), ServiceResult::Success);
}

#[test]
fn packet_limit_rejects_undecided_flow() {
    let mut config = DetectorConfig::new();
    config.max_packets = 3;
    let mut flow = TestFlow::new(config);
    let client_first = c0_and_c1();

    assert_eq!(flow.client(&client_first[..10]), ServiceResult::InProgress);
    assert_eq!(flow.client(&client_first[10..20]), ServiceResult::InProgress);
    assert_eq!(flow.client(&client_first[20..30]), ServiceResult::NoMatch);
}

#[test]
fn completing_on_the_last_allowed_packet_succeeds() {
    let mut config = DetectorConfig::new();
    config.max_packets = 4;
    let mut flow = TestFlow::new(config);

    let results = run_valid_flow(&mut flow);
    assert_eq!(results[3], ServiceResult::Success);
}

#[test]
fn empty_packet_only_checks_packet_limit() {
    let mut config = DetectorConfig::new();
    config.max_packets = 2;
    let mut flow = TestFlow::new(config);

    assert_eq!(flow.client(&[]), ServiceResult::InProgress);
    assert_eq!(flow.state().client_state(), HandshakeState::Init);
    assert_eq!(flow.server(&[]), ServiceResult::NoMatch);
}

#[test]
fn existing_session_url_is_not_replaced() {
    let mut flow = TestFlow::unlimited();
    flow.flows.http_session(&FLOW).url = Some("http://already/set".to_string());

    let results = run_valid_flow(&mut flow);
    assert_eq!(results[3], ServiceResult::Success);

    let session = flow.http_session().expect("No http session created");
    assert_eq!(session.url, Some("http://already/set".to_string()));
    assert_eq!(session.referer, Some(PAGE_URL.to_string()));
    assert!(!session.scan_host_url, "Url scan requested for discarded swfUrl");
}

#[test]
fn existing_session_referer_is_not_replaced() {
    let mut flow = TestFlow::unlimited();
    flow.flows.http_session(&FLOW).referer = Some("http://already/set".to_string());

    run_valid_flow(&mut flow);

    let session = flow.http_session().expect("No http session created");
    assert_eq!(session.url, Some(SWF_URL.to_string()));
    assert_eq!(session.referer, Some("http://already/set".to_string()));
}

#[test]
fn referer_is_not_published_when_capture_disabled() {
    let mut config = DetectorConfig::new();
    config.max_packets = 100;
    config.referrer_capture_disabled = true;
    let mut flow = TestFlow::new(config);

    let results = run_valid_flow(&mut flow);
    assert_eq!(results[3], ServiceResult::Success);

    let session = flow.http_session().expect("No http session created");
    assert_eq!(session.url, Some(SWF_URL.to_string()));
    assert_eq!(session.referer, None);
}

fn client_packet(data: &[u8], session_packet_count: u32) -> Packet<'_> {
    Packet {
        data,
        direction: Direction::FromInitiator,
        session_packet_count,
    }
}

#[test]
fn flows_are_tracked_independently() {
    let detector = RtmpDetector::new(DetectorConfig::new());
    let mut flows = FlowTable::new();
    let good = c0_and_c1();
    let bad = [4_u8];

    assert_eq!(
        detector.validate(&mut flows, &1, &client_packet(&bad, 1)),
        ServiceResult::NoMatch
    );
    assert_eq!(
        detector.validate(&mut flows, &2, &client_packet(&good, 1)),
        ServiceResult::InProgress
    );

    assert_eq!(flows.len(), 2);
    assert_eq!(flows.outcome(&1), Some(&FlowOutcome::Failed));
    assert_eq!(flows.outcome(&2), Some(&FlowOutcome::InProgress));

    flows.remove(&1);
    assert_eq!(flows.len(), 1);
}
