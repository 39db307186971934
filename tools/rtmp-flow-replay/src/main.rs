extern crate rml_rtmp_probe;

use rml_rtmp_probe::detector::{
    DetectorConfig, Direction, FlowTable, Packet, RtmpDetector, ServiceResult,
};
use rml_rtmp_probe::handshake::HANDSHAKE_PACKET_SIZE;
use std::env;
use std::fs;
use std::process;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const FLOW_ID: u32 = 1;
const DEFAULT_SEGMENT_SIZE: usize = 1460;

struct Options {
    client_file: String,
    server_file: String,
    segment_size: usize,
    config: DetectorConfig,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            println!("{}", message);
            println!();
            print_usage();
            process::exit(1);
        }
    };

    let client_bytes = read_file(&options.client_file);
    let server_bytes = read_file(&options.server_file);

    let mut replay = Replay {
        detector: RtmpDetector::new(options.config.clone()),
        flows: FlowTable::new(),
        packet_count: 0,
        segment_size: options.segment_size,
    };

    let result = replay.run(&client_bytes, &server_bytes);
    println!("Result after {} packets: {:?}", replay.packet_count, result);

    if let Some(entry) = replay.flows.get(&FLOW_ID) {
        if let Some(session) = &entry.http_session {
            println!("Url:     {}", session.url.as_deref().unwrap_or("<none>"));
            println!("Referer: {}", session.referer.as_deref().unwrap_or("<none>"));
        }
    }
}

fn print_usage() {
    println!("RTMP flow replay");
    println!("Replays raw binary captured from each direction of an RTMP connection through");
    println!("the RTMP flow detector and reports whether the flow was identified.");
    println!();
    println!("Usage: rtmp-flow-replay <client capture> <server capture> [options]");
    println!("  --segment-size <bytes>   Largest packet to deliver during the handshake (default {})", DEFAULT_SEGMENT_SIZE);
    println!("  --max-packets <count>    Packets to observe before giving up (default {})", DetectorConfig::new().max_packets);
    println!("  --no-referrer            Do not publish the connect command's pageUrl");
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut files = Vec::new();
    let mut segment_size = DEFAULT_SEGMENT_SIZE;
    let mut config = DetectorConfig::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--segment-size" => segment_size = parse_number(arg, iter.next())?,
            "--max-packets" => config.max_packets = parse_number(arg, iter.next())?,
            "--no-referrer" => config.referrer_capture_disabled = true,
            x if x.starts_with("--") => return Err(format!("Unknown option {}", x)),
            x => files.push(x.to_string()),
        }
    }

    if files.len() != 2 {
        return Err("Both a client capture and a server capture must be specified".to_string());
    }

    if segment_size == 0 {
        return Err("Segment size must be greater than zero".to_string());
    }

    let server_file = files.pop().unwrap_or_default();
    let client_file = files.pop().unwrap_or_default();
    Ok(Options {
        client_file,
        server_file,
        segment_size,
        config,
    })
}

fn parse_number<T: std::str::FromStr>(name: &str, value: Option<&String>) -> Result<T, String> {
    value
        .and_then(|value| value.parse().ok())
        .ok_or_else(|| format!("{} requires a numeric value", name))
}

fn read_file(path: &str) -> Vec<u8> {
    match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            error!(path, %err, "Could not read capture");
            process::exit(1);
        }
    }
}

struct Replay {
    detector: RtmpDetector,
    flows: FlowTable<u32>,
    packet_count: u32,
    segment_size: usize,
}

impl Replay {
    /// Delivers the captures in the order a real connection would produce them: C0 and C1,
    /// then S0, S1 and S2, then C2.  Whatever follows the handshake in each direction is
    /// delivered as a single packet.
    fn run(&mut self, client_bytes: &[u8], server_bytes: &[u8]) -> ServiceResult {
        let packet_size = HANDSHAKE_PACKET_SIZE as usize;
        let (client_first, client_rest) = split(client_bytes, 1 + packet_size);
        let (c2, client_after_handshake) = split(client_rest, packet_size);
        let (server_handshake, server_after_handshake) = split(server_bytes, 1 + packet_size * 2);

        let steps: [(Direction, &[u8], bool); 5] = [
            (Direction::FromInitiator, client_first, true),
            (Direction::FromResponder, server_handshake, true),
            (Direction::FromInitiator, c2, true),
            (Direction::FromInitiator, client_after_handshake, false),
            (Direction::FromResponder, server_after_handshake, false),
        ];

        let mut result = ServiceResult::InProgress;
        for &(direction, bytes, segmented) in steps.iter() {
            if bytes.is_empty() {
                continue;
            }

            let segment_size = if segmented { self.segment_size } else { bytes.len() };
            for segment in bytes.chunks(segment_size) {
                result = self.deliver(direction, segment);
                if result != ServiceResult::InProgress {
                    return result;
                }
            }
        }

        result
    }

    fn deliver(&mut self, direction: Direction, data: &[u8]) -> ServiceResult {
        self.packet_count += 1;
        let packet = Packet {
            data,
            direction,
            session_packet_count: self.packet_count,
        };

        let result = self.detector.validate(&mut self.flows, &FLOW_ID, &packet);
        info!(
            packet = self.packet_count,
            ?direction,
            bytes = data.len(),
            ?result,
            "Delivered packet"
        );

        result
    }
}

fn split(bytes: &[u8], at: usize) -> (&[u8], &[u8]) {
    bytes.split_at(at.min(bytes.len()))
}
