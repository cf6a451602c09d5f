use proptest::prelude::*;
use session::{AudioChunk, Dispatcher, SessionConfig, TrainingResponder};
use wire::{
    decode_pdu, encode_formats, encode_pdu, encode_wave, select_format, AudioFormat, FormatTable,
    FormatTag, MessageType,
};

type TestDispatcher = Dispatcher<Vec<Vec<u8>>, Vec<AudioChunk>>;

fn dispatcher() -> TestDispatcher {
    Dispatcher::new(SessionConfig::default(), Vec::new(), Vec::new())
}

fn negotiated_dispatcher() -> TestDispatcher {
    let mut dispatcher = dispatcher();
    let formats = encode_formats(5, 0, &[AudioFormat::pcm(2, 44_100, 16)]).unwrap();
    dispatcher.on_inbound_bytes(&formats);
    dispatcher
}

fn format_with_tag(raw: u16) -> AudioFormat {
    AudioFormat {
        tag: FormatTag::from_raw(raw),
        channels: 2,
        samples_per_second: 44_100,
        bytes_per_second: 176_400,
        block_align: 4,
        bits_per_sample: 16,
        codec_data: Vec::new(),
    }
}

#[derive(Debug, Clone)]
enum Step {
    Training(Vec<u8>),
    Wave(u32, u8, Vec<u8>),
    Close,
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        prop::collection::vec(any::<u8>(), 4..32).prop_map(Step::Training),
        (any::<u32>(), any::<u8>(), prop::collection::vec(any::<u8>(), 4..128))
            .prop_map(|(timestamp, block_no, samples)| Step::Wave(timestamp, block_no, samples)),
        Just(Step::Close),
    ]
}

fn encode_step(step: &Step) -> Vec<u8> {
    match step {
        Step::Training(body) => encode_pdu(MessageType::Training, body).unwrap(),
        Step::Wave(timestamp, block_no, samples) => {
            encode_wave(0, *timestamp, *block_no, samples).unwrap()
        }
        Step::Close => encode_pdu(MessageType::Close, &[]).unwrap(),
    }
}

proptest! {
    #[test]
    fn prop_split_stream_matches_whole(
        steps in prop::collection::vec(step_strategy(), 1..12),
        cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..8),
    ) {
        let stream: Vec<u8> = steps.iter().flat_map(encode_step).collect();

        let mut whole = negotiated_dispatcher();
        let expected = whole.on_inbound_bytes(&stream);

        let mut points: Vec<usize> = cuts.iter().map(|cut| cut.index(stream.len())).collect();
        points.sort_unstable();
        let mut split = negotiated_dispatcher();
        let mut outcomes = Vec::new();
        let mut start = 0;
        for point in points.into_iter().chain(std::iter::once(stream.len())) {
            outcomes.extend(split.on_inbound_bytes(&stream[start..point]));
            start = point;
        }

        prop_assert_eq!(outcomes, expected);
        prop_assert_eq!(split.sink(), whole.sink());
        prop_assert_eq!(split.transport(), whole.transport());
    }

    #[test]
    fn prop_wave_pair_reassembles(
        info in prop::array::uniform12(any::<u8>()),
        data in prop::collection::vec(any::<u8>(), 4..256),
    ) {
        let mut info = info;
        // Client format list has a single entry
        info[0] = 0;
        info[1] = 0;
        let body_size = (12 + data.len() - 4) as u16;
        let mut stream = vec![MessageType::Wave.raw(), 0];
        stream.extend_from_slice(&body_size.to_le_bytes());
        stream.extend_from_slice(&info);
        stream.extend_from_slice(&data);

        let mut dispatcher = negotiated_dispatcher();
        let outcomes = dispatcher.on_inbound_bytes(&stream);
        prop_assert_eq!(outcomes.len(), 2);

        let chunk = &dispatcher.sink()[0];
        let mut expected = info[8..12].to_vec();
        expected.extend_from_slice(&data[4..]);
        prop_assert_eq!(&chunk.samples, &expected);
        prop_assert_eq!(chunk.format_index, u16::from_le_bytes([info[0], info[1]]));
        prop_assert_eq!(
            chunk.timestamp,
            u32::from_le_bytes([info[2], info[3], info[4], info[5]])
        );
        prop_assert_eq!(chunk.block_no, info[6]);
    }

    #[test]
    fn prop_training_echo_is_verbatim(body in prop::collection::vec(any::<u8>(), 4..512)) {
        let response = TrainingResponder::new().handle(&body).unwrap();
        let pdu = decode_pdu(&response).unwrap();
        prop_assert_eq!(pdu.header.message_type, MessageType::Training);
        prop_assert_eq!(pdu.body, body.as_slice());
    }

    #[test]
    fn prop_select_prefers_pcm(tags in prop::collection::vec(0u16..4, 1..16)) {
        let table = FormatTable {
            version: 6,
            flags: 0,
            formats: tags.iter().copied().map(format_with_tag).collect(),
        };
        let selected = select_format(&table).unwrap();
        match tags.iter().position(|&tag| tag == FormatTag::WAVE_FORMAT_PCM) {
            Some(first_pcm) => prop_assert_eq!(selected, first_pcm),
            None => prop_assert_eq!(selected, 0),
        }
    }

    #[test]
    fn prop_quality_only_for_capable_servers(version in any::<u16>()) {
        let mut dispatcher = dispatcher();
        let formats = encode_formats(version, 0, &[AudioFormat::pcm(2, 44_100, 16)]).unwrap();
        dispatcher.on_inbound_bytes(&formats);
        dispatcher.on_inbound_bytes(&formats);
        let quality_pdus = dispatcher
            .transport()
            .iter()
            .filter(|pdu| pdu[0] == MessageType::QualityMode.raw())
            .count();
        prop_assert_eq!(quality_pdus, usize::from(version >= 6));
    }

    #[test]
    fn prop_arbitrary_bytes_never_panic(
        chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 0..16),
    ) {
        let mut dispatcher = negotiated_dispatcher();
        let mut total = 0;
        let mut outcomes = 0;
        for chunk in &chunks {
            total += chunk.len();
            outcomes += dispatcher.on_inbound_bytes(chunk).len();
        }
        // Every framed PDU consumes at least four bytes
        prop_assert!(outcomes * 4 <= total);
        prop_assert!(dispatcher.buffered_len() <= total);
    }
}
