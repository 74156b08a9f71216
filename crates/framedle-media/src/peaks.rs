//! Peak selection over a video heatmap.
//!
//! Greedy selection: scan segments from hottest to coldest, take each
//! segment's midpoint (kept away from the video edges) and accept it unless
//! it lies closer than `min_spacing` to an already accepted timestamp.

use std::cmp::Ordering;

use framedle_models::constants::EDGE_MARGIN_SECS;
use framedle_models::{HeatSegment, Moment};
use tracing::info;

use crate::error::{MediaError, MediaResult};

/// Select up to `count` well-spaced peak moments.
///
/// Ties in heat value keep their original order, so identical input always
/// yields identical output. Returning fewer than `count` moments is valid.
/// The caller must make sure `duration` leaves a usable clamp interval.
pub fn select_peaks(
    segments: &[HeatSegment],
    duration: f64,
    count: usize,
    min_spacing: f64,
) -> MediaResult<Vec<Moment>> {
    if segments.is_empty() {
        return Err(MediaError::invalid_input(
            "Heatmap data is empty or unavailable for this video",
        ));
    }

    // Stable sort: equal values stay in input order.
    let mut ordered: Vec<&HeatSegment> = segments.iter().collect();
    ordered.sort_by(|a, b| by_value_desc(a.value, b.value));

    let mut selected: Vec<Moment> = Vec::with_capacity(count);

    for segment in ordered {
        if selected.len() >= count {
            break;
        }

        let timestamp = clamp_to_edges(segment.midpoint(), duration);

        let too_close = selected
            .iter()
            .any(|m| (timestamp - m.timestamp).abs() < min_spacing);
        if too_close {
            continue;
        }

        selected.push(Moment {
            timestamp,
            value: segment.value,
            start_time: segment.start_time,
            end_time: segment.end_time,
            rank: 0,
        });
    }

    // Rank 1 must be the globally hottest accepted moment.
    selected.sort_by(|a, b| by_value_desc(a.value, b.value));
    for (i, moment) in selected.iter_mut().enumerate() {
        moment.rank = i as u32 + 1;
    }

    info!("Selected {} peak moments", selected.len());
    for m in &selected {
        info!(
            rank = m.rank,
            "Rank {}: {:.1}s (heat={:.3})",
            m.rank,
            m.timestamp,
            m.value
        );
    }

    Ok(selected)
}

/// Evenly spaced, strictly descending heatmap used when the platform
/// reports none.
///
/// Segment `i` (1-based) spans `[i * d / (count + 1), (i + 1) * d / (count + 1)]`.
pub fn synthetic_heatmap(duration: f64, count: usize) -> Vec<HeatSegment> {
    let slot = duration / (count as f64 + 1.0);
    let step = 0.1_f64.min(1.0 / (count as f64 + 1.0));

    (1..=count)
        .map(|i| {
            let i = i as f64;
            HeatSegment::new(i * slot, (i + 1.0) * slot, 1.0 - i * step)
        })
        .collect()
}

/// `max(margin, min(t, duration - margin))`, never panics on short videos.
fn clamp_to_edges(timestamp: f64, duration: f64) -> f64 {
    timestamp.min(duration - EDGE_MARGIN_SECS).max(EDGE_MARGIN_SECS)
}

fn by_value_desc(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}
