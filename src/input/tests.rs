// src/input/tests.rs

use super::*;
use test_log::test;

/// Feeds `raws` one frame at a time and collects what each frame reports.
fn run_channel<T: Clone + PartialEq>(channel: &mut Channel<T>, raws: &[Option<T>]) -> Vec<Option<T>> {
    raws.iter()
        .map(|raw| {
            channel.advance(raw.clone());
            channel.report().cloned()
        })
        .collect()
}

fn at(x: i32, y: i32) -> StandardPoint {
    StandardPoint::new(x, y)
}

#[test]
fn held_input_is_reported_once() {
    let (a, b) = (Some('a'), Some('b'));
    let mut channel = Channel::new();
    let reports = run_channel(&mut channel, &[a, a, a, b, b, None, a]);
    assert_eq!(reports, vec![a, None, None, b, None, None, a]);
}

#[test]
fn idle_frames_report_idle() {
    let mut channel: Channel<KeySymbol> = Channel::new();
    let reports = run_channel(&mut channel, &[None, None, None]);
    assert_eq!(reports, vec![None, None, None]);
    assert_eq!(channel.last_real(), None);
    assert_eq!(channel.last_reported(), None);
}

#[test]
fn last_real_is_captured_when_channel_goes_idle() {
    let mut channel = Channel::new();
    channel.advance(Some(KeySymbol::Char('a')));
    assert_eq!(channel.last_real(), None);
    channel.advance(None);
    assert_eq!(channel.last_real(), Some(&KeySymbol::Char('a')));

    // Persists through further idle frames and only moves on the next idle edge.
    channel.advance(None);
    channel.advance(Some(KeySymbol::Enter));
    assert_eq!(channel.last_real(), Some(&KeySymbol::Char('a')));
    channel.advance(None);
    assert_eq!(channel.last_real(), Some(&KeySymbol::Enter));
}

#[test]
fn last_real_follows_held_value_not_report() {
    let mut channel = Channel::new();
    run_channel(&mut channel, &[Some(1), Some(1), Some(1), None]);
    assert_eq!(channel.last_real(), Some(&1));
    assert_eq!(channel.last_reported(), Some(&1));
}

#[test]
fn comparison_uses_previous_raw_sample_not_last_report() {
    // The second `a` differs from its immediate predecessor (`None`), so it is
    // reported again even though `a` was the last value reported.
    let mut channel = Channel::new();
    let reports = run_channel(&mut channel, &[Some('a'), None, Some('a'), Some('b'), Some('a')]);
    assert_eq!(reports, vec![Some('a'), None, Some('a'), Some('b'), Some('a')]);
}

#[test]
fn report_is_stable_within_a_frame() {
    let mut channel = Channel::new();
    channel.advance(Some(7));
    assert_eq!(channel.report(), Some(&7));
    assert_eq!(channel.report(), Some(&7));
    assert_eq!(channel.raw(), Some(&7));

    channel.advance(Some(7));
    assert_eq!(channel.report(), None);
    assert_eq!(channel.raw(), Some(&7));
}

#[test]
fn pointer_positions_compare_by_coordinates() {
    let mut channel = Channel::new();
    let reports = run_channel(
        &mut channel,
        &[Some(at(1, 1)), Some(at(1, 1)), Some(at(2, 1)), Some(at(2, 1)), Some(at(1, 1))],
    );
    assert_eq!(
        reports,
        vec![Some(at(1, 1)), None, Some(at(2, 1)), None, Some(at(1, 1))]
    );
}

#[test]
fn later_events_in_a_frame_replace_earlier_ones() {
    let mut samples = FrameSamples::default();
    samples.record_motion(at(1, 2));
    samples.record_motion(at(3, 4));
    samples.record_click(at(9, 9));
    samples.record_click(at(5, 6));
    samples.record_key(KeySymbol::Char('x'));
    samples.record_key(KeySymbol::Char('y'));

    assert_eq!(samples.motion, Some(at(3, 4)));
    assert_eq!(samples.click, Some(at(5, 6)));
    assert_eq!(samples.key, Some(KeySymbol::Char('y')));
}

#[test]
fn click_ending_where_the_previous_frame_ended_is_idle() {
    let mut input = InputNormalizer::new();

    let mut first = FrameSamples::default();
    first.record_click(at(5, 5));
    input.begin_frame(first);
    assert_eq!(input.report_click(), Some(at(5, 5)));

    // Clicked elsewhere, then back on the same spot within one frame.
    let mut second = FrameSamples::default();
    second.record_click(at(40, 40));
    second.record_click(at(5, 5));
    input.begin_frame(second);
    assert_eq!(input.report_click(), None);
}

#[test]
fn channels_are_independent() {
    let mut input = InputNormalizer::new();

    let mut first = FrameSamples::default();
    first.record_key(KeySymbol::Char('a'));
    first.record_click(StandardPoint::new(5, 5));
    input.begin_frame(first);
    assert_eq!(input.report_key(), Some(KeySymbol::Char('a')));
    assert_eq!(input.report_click(), Some(at(5, 5)));
    assert_eq!(input.report_motion(), None);

    // Same key held, click released, motion starts.
    let mut second = FrameSamples::default();
    second.record_key(KeySymbol::Char('a'));
    second.record_motion(StandardPoint::new(6, 6));
    input.begin_frame(second);
    assert_eq!(input.report_key(), None);
    assert_eq!(input.report_click(), None);
    assert_eq!(input.report_motion(), Some(at(6, 6)));
    assert_eq!(input.last_real_click(), Some(at(5, 5)));
    assert_eq!(input.last_real_key(), None);

    input.begin_frame(FrameSamples::default());
    assert_eq!(input.last_real_key(), Some(KeySymbol::Char('a')));
    assert_eq!(input.last_real_motion(), Some(at(6, 6)));
}
