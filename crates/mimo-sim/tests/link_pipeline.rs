//! End-to-end link behavior across channel shapes, seeds and frame sizes.

use mimo_core::bit_packing::IndexPacker;
use mimo_core::channel_matrix::ChannelMatrix;
use mimo_core::combiner::Combiner;
use mimo_core::config::LinkConfig;
use mimo_core::decomposition::{Decomposer, Decomposition};
use mimo_core::equalizer::ZfEqualizer;
use mimo_core::layer_mapping::{LayerDemapper, LayerMapper};
use mimo_core::padding::{Depadder, Padder};
use mimo_core::precoder::Precoder;
use mimo_core::symbol_mapping::SymbolMapper;
use mimo_core::types::{MimoError, SymbolIndex};
use mimo_sim::channel::{rng_from_seed, ChannelModel, ChannelTransmitter, NoiseBounds};
use mimo_sim::simulator::LinkSimulator;

fn frame_from_bytes(bytes: &[u8]) -> Vec<SymbolIndex> {
    IndexPacker.unpack(bytes)
}

fn text_frame() -> Vec<SymbolIndex> {
    frame_from_bytes(b"spatial multiplexing over an SVD-precoded link")
}

#[test]
fn identity_channel_recovers_exactly() {
    for n in [1, 2, 4, 8] {
        let config = LinkConfig::square(n).noiseless();
        let mut sim = LinkSimulator::new(config).unwrap().with_trace(true);
        let tx = text_frame();
        let report = sim
            .run_with_decomposition(&tx, &ChannelMatrix::identity(n), &Decomposition::identity(n))
            .unwrap();

        assert_eq!(report.recovered, tx, "{n}x{n}");
        let trace = report.trace.unwrap();
        assert_eq!(trace.depadded.len(), trace.symbols.len());
        for (a, b) in trace.symbols.iter().zip(&trace.depadded) {
            assert!((a - b).norm() < 1e-6, "{n}x{n}: {a} vs {b}");
        }
    }
}

#[test]
fn random_channel_noiseless_recovers_every_shape() {
    for (nr, nt) in [(2, 4), (4, 2), (4, 4), (8, 8), (3, 5), (6, 1)] {
        let config = LinkConfig::new(nr, nt, 0.0, 0.0).with_seed(1000 + (nr * 10 + nt) as u64);
        let mut sim = LinkSimulator::new(config).unwrap();
        let tx = text_frame();
        let report = sim.run(&tx).unwrap();
        assert_eq!(report.recovered, tx, "{nr}x{nt}");
        assert_eq!(report.statistics.symbol_errors, 0);
        assert_eq!(report.singular_values.len(), nr.min(nt));
        assert_eq!(report.plan.antenna_pad, nt - nr.min(nt));
    }
}

#[test]
fn equalized_streams_match_layered_streams() {
    let config = LinkConfig::new(5, 3, 0.0, 0.0).with_seed(77);
    let mut sim = LinkSimulator::new(config).unwrap().with_trace(true);
    let report = sim.run(&text_frame()).unwrap();
    let trace = report.trace.unwrap();
    assert_eq!(trace.equalized.num_streams(), trace.layered.num_streams());
    for (eq, tx) in trace.equalized.iter().zip(trace.layered.iter()) {
        for (a, b) in eq.iter().zip(tx) {
            assert!((a - b).norm() < 1e-6);
        }
    }
}

#[test]
fn same_seed_same_run() {
    let config = LinkConfig::new(4, 3, -0.3, 0.3).with_seed(31337);
    let tx = text_frame();

    let a = LinkSimulator::new(config.clone())
        .unwrap()
        .with_trace(true)
        .run(&tx)
        .unwrap();
    let b = LinkSimulator::new(config)
        .unwrap()
        .with_trace(true)
        .run(&tx)
        .unwrap();

    assert_eq!(a.channel, b.channel);
    assert_eq!(a.statistics, b.statistics);
    assert_eq!(a.recovered, b.recovered);
    assert_eq!(a.trace, b.trace);
}

#[test]
fn consecutive_runs_draw_new_channels() {
    let mut sim = LinkSimulator::new(LinkConfig::square(3).with_seed(5)).unwrap();
    let first = sim.run(&text_frame()).unwrap();
    let second = sim.run(&text_frame()).unwrap();
    assert_ne!(first.channel, second.channel);
}

#[test]
fn stages_leave_inputs_untouched() {
    let config = LinkConfig::new(3, 4, -0.05, 0.05).with_seed(9);
    let mut sim = LinkSimulator::new(config).unwrap().with_trace(true);
    let tx = text_frame();
    let report = sim.run(&tx).unwrap();
    let trace = report.trace.unwrap();
    let plan = report.plan;

    let h = ChannelMatrix::from_rows(&report.channel).unwrap();
    let d = Decomposer::default().decompose(&h).unwrap();

    // Re-run each deterministic stage from its traced input; the input must
    // compare equal before and after, and the output must match the trace.
    let symbols_before = trace.symbols.clone();
    let padded = Padder::new(plan.total_pad()).pad(&trace.symbols);
    assert_eq!(trace.symbols, symbols_before);
    assert_eq!(padded, trace.padded);

    let padded_before = trace.padded.clone();
    let layered = LayerMapper::new(plan.num_streams)
        .unwrap()
        .map(&trace.padded)
        .unwrap();
    assert_eq!(trace.padded, padded_before);
    assert_eq!(layered, trace.layered);

    let layered_before = trace.layered.clone();
    let precoded = Precoder::new(&d).precode(&trace.layered);
    assert_eq!(trace.layered, layered_before);
    assert_eq!(precoded, trace.precoded);

    let received_before = trace.received.clone();
    let combined = Combiner::new(&d).combine(&trace.received);
    assert_eq!(trace.received, received_before);
    assert_eq!(combined, trace.combined);

    let combined_before = trace.combined.clone();
    let equalized = ZfEqualizer::new(d.singular_values())
        .unwrap()
        .equalize(&trace.combined);
    assert_eq!(trace.combined, combined_before);
    assert_eq!(equalized, trace.equalized);

    let equalized_before = trace.equalized.clone();
    let delayered = LayerDemapper.demap(&trace.equalized);
    assert_eq!(trace.equalized, equalized_before);
    assert_eq!(delayered, trace.delayered);

    let delayered_before = trace.delayered.clone();
    let depadded = Depadder::new(plan.total_pad())
        .depad(&trace.delayered)
        .unwrap();
    assert_eq!(trace.delayered, delayered_before);
    assert_eq!(depadded, trace.depadded);

    assert_eq!(SymbolMapper.map(&tx).unwrap(), trace.symbols);
}

#[test]
fn trace_factors_rebuild_the_channel() {
    let config = LinkConfig::new(3, 4, 0.0, 0.0).with_seed(8);
    let mut sim = LinkSimulator::new(config).unwrap().with_trace(true);
    let report = sim.run(&text_frame()).unwrap();
    let trace = report.trace.unwrap();
    let s = &report.singular_values;

    assert_eq!(trace.u.len(), 3);
    assert_eq!(trace.v.len(), 4);
    assert!(trace.u.iter().chain(&trace.v).all(|row| row.len() == 3));
    for (r, h_row) in report.channel.iter().enumerate() {
        for (c, &h) in h_row.iter().enumerate() {
            let rebuilt: f64 = (0..s.len()).map(|k| trace.u[r][k] * s[k] * trace.v[c][k]).sum();
            assert!((rebuilt - h).abs() < 1e-9, "H[{r}][{c}]");
        }
    }
}

#[test]
fn rejected_frame_does_not_shift_later_runs() {
    let config = LinkConfig::new(4, 2, -0.05, 0.05).with_seed(404);
    let fresh = LinkSimulator::new(config.clone())
        .unwrap()
        .run(&text_frame())
        .unwrap();

    let mut sim = LinkSimulator::new(config).unwrap();
    let mut bad = text_frame();
    bad[5] = 7;
    assert!(matches!(
        sim.run(&bad).unwrap_err(),
        MimoError::InvalidSymbolIndex { index: 7, position: 5 }
    ));
    let report = sim.run(&text_frame()).unwrap();
    assert_eq!(report.channel, fresh.channel);
    assert_eq!(report.statistics, fresh.statistics);
}

#[test]
fn transmitter_noise_is_bounded() {
    let mut rng = rng_from_seed(Some(12));
    let h = ChannelModel::default().generate(4, 4, &mut rng).unwrap();
    let noiseless = ChannelTransmitter::new(h.clone(), NoiseBounds::none());
    let noisy = ChannelTransmitter::new(h, NoiseBounds::new(-0.1, 0.1).unwrap());

    let x = LayerMapper::new(4)
        .unwrap()
        .map(&SymbolMapper.map(&text_frame()).unwrap())
        .unwrap();
    let clean = noiseless.transmit(&x, &mut rng);
    let dirty = noisy.transmit(&x, &mut rng);
    for (c, d) in clean.iter().flatten().zip(dirty.iter().flatten()) {
        let n = d - c;
        assert!(n.re.abs() <= 0.1 + 1e-12 && n.im.abs() <= 0.1 + 1e-12);
    }
}

#[test]
fn rank_deficient_channel_is_degenerate() {
    let config = LinkConfig::square(3).noiseless();
    let mut sim = LinkSimulator::new(config).unwrap();
    let h = ChannelMatrix::from_rows(&[
        vec![1.0, 0.0, 0.0],
        vec![0.0, 1.0, 0.0],
        vec![0.0, 0.0, 0.0],
    ])
    .unwrap();
    match sim.run_with_channel(&text_frame(), &h).unwrap_err() {
        MimoError::DegenerateChannel { stream, value, .. } => {
            assert_eq!(stream, 2);
            assert!(value.abs() <= 1e-9);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn odd_frame_lengths_are_padded() {
    // 3 streams: lengths not divisible by 3 still round-trip
    for len in [1, 2, 4, 5, 7, 11] {
        let tx: Vec<SymbolIndex> = (0..len).map(|i| (3 - i % 4) as SymbolIndex).collect();
        let config = LinkConfig::new(3, 3, 0.0, 0.0).with_seed(len as u64);
        let report = LinkSimulator::new(config).unwrap().run(&tx).unwrap();
        assert_eq!(report.recovered, tx, "len {len}");
        assert_eq!(report.plan.frame_len % 3, 0);
    }
}

#[test]
fn bytes_survive_the_link() {
    let payload = b"\x00\x1b\xe4\xffMIMO";
    let tx = frame_from_bytes(payload);
    let config = LinkConfig::new(4, 4, -0.01, 0.01).with_seed(3);
    let mut sim = LinkSimulator::new(config).unwrap();
    let report = sim
        .run_with_channel(&tx, &ChannelMatrix::identity(4))
        .unwrap();
    assert_eq!(IndexPacker.pack(&report.recovered).unwrap(), payload.to_vec());
}

#[test]
fn report_serializes_to_json() {
    let mut sim = LinkSimulator::new(LinkConfig::new(2, 3, 0.0, 0.0).with_seed(1)).unwrap();
    let report = sim.run(&[0, 1, 2, 3]).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["statistics"]["total_symbols"], 4);
    assert_eq!(json["plan"]["num_streams"], 2);
    assert!(json.get("trace").is_none());
    assert_eq!(json["channel"].as_array().unwrap().len(), 2);
}
