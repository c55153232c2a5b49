//! Speaker-attribution fuser.
//!
//! Merges diarization output (speaker-labeled time intervals) with a
//! transcript's segment and word time spans, assigning each unit the
//! speaker with the greatest total temporal overlap.
//!
//! Overlap is clamped before summation: a raw intersection
//! `min(ends) - max(starts)` below zero contributes nothing. Units with
//! malformed spans (end < start) therefore overlap nothing and stay
//! unassigned rather than erroring.

use crate::diarize::SpeakerInterval;
use crate::progress::ProgressSink;
use crate::transcript::Transcript;
use std::collections::BTreeMap;

/// How to assign a speaker when a unit overlaps no interval at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapMode {
    /// Units without positive overlap stay unassigned.
    #[default]
    Strict,
    /// Units without positive overlap fall back to the temporally nearest
    /// speaker interval.
    FillNearest,
}

/// Assign speakers to every segment and word of the transcript, in place.
///
/// Segments are processed in transcript order; within a segment the
/// segment-level assignment happens first, then each word in order. Word
/// and segment assignment are independent applications of the same rule.
///
/// Progress is reported through `sink` as a monotone percentage, with
/// partial credit for words inside the current segment, ending at exactly
/// 100. An empty interval set leaves the transcript unmodified (still
/// reporting 100). Running the fuser twice with the same intervals yields
/// the same assignments.
pub fn assign_speakers(
    transcript: &mut Transcript,
    intervals: &[SpeakerInterval],
    mode: OverlapMode,
    sink: &dyn ProgressSink,
) {
    let total_segments = transcript.segments.len();

    if intervals.is_empty() || total_segments == 0 {
        sink.percent(100.0);
        return;
    }

    for (i, segment) in transcript.segments.iter_mut().enumerate() {
        sink.percent((i as f32 / total_segments as f32) * 100.0);

        if let Some(speaker) = best_speaker(segment.start, segment.end, intervals, mode) {
            segment.speaker = Some(speaker.to_string());
        }

        if let Some(words) = segment.words.as_mut() {
            let total_words = words.len();
            for (j, word) in words.iter_mut().enumerate() {
                if let Some(speaker) = best_speaker(word.start, word.end, intervals, mode) {
                    word.speaker = Some(speaker.to_string());
                }

                let word_fraction = (j + 1) as f32 / total_words as f32;
                sink.percent(((i as f32 + word_fraction) / total_segments as f32) * 100.0);
            }
        }
    }

    sink.percent(100.0);
}

/// The speaker with the greatest summed positive overlap with `[start, end]`.
///
/// Ties resolve to the lexicographically smallest label: candidates are
/// visited in `BTreeMap` order and only a strictly greater total replaces
/// the current best.
fn best_speaker<'a>(
    start: f64,
    end: f64,
    intervals: &'a [SpeakerInterval],
    mode: OverlapMode,
) -> Option<&'a str> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for interval in intervals {
        let overlap = (end.min(interval.end) - start.max(interval.start)).max(0.0);
        if overlap > 0.0 {
            *totals.entry(interval.speaker.as_str()).or_insert(0.0) += overlap;
        }
    }

    let mut best: Option<(&str, f64)> = None;
    for (&speaker, &total) in &totals {
        match best {
            Some((_, best_total)) if total <= best_total => {}
            _ => best = Some((speaker, total)),
        }
    }

    if let Some((speaker, _)) = best {
        return Some(speaker);
    }

    match mode {
        OverlapMode::Strict => None,
        OverlapMode::FillNearest => nearest_speaker(start, end, intervals),
    }
}

/// The speaker whose interval is temporally closest to `[start, end]`.
///
/// Distances are clamped gaps, never signed overlap sums, so a speaker
/// with many far-away intervals is not penalized for their count. Ties
/// resolve to the lexicographically smallest label.
fn nearest_speaker<'a>(
    start: f64,
    end: f64,
    intervals: &'a [SpeakerInterval],
) -> Option<&'a str> {
    let mut best: Option<(f64, &str)> = None;
    for interval in intervals {
        let gap = (interval.start - end).max(start - interval.end).max(0.0);
        let candidate = (gap, interval.speaker.as_str());
        let better = match best {
            None => true,
            Some((best_gap, best_label)) => {
                gap < best_gap || (gap == best_gap && candidate.1 < best_label)
            }
        };
        if better {
            best = Some(candidate);
        }
    }
    best.map(|(_, speaker)| speaker)
}
