//! Mapping from base-text scroll offsets to the commentary entry that should
//! sit at the top of the panel.

use crate::commentary::{CommentaryEntry, FilterOutcome};

/// Source of rendered segment positions.
pub trait LayoutProvider {
    /// Top offset of every rendered segment, in document order.
    fn segment_tops(&self) -> Vec<f32>;

    fn viewport_height(&self) -> f32;

    /// Store positions measured by the renderer.
    fn record_tops(&mut self, tops: Vec<f32>);

    fn record_viewport_height(&mut self, height: f32);
}

/// Layout with positions given up front; measurements are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixedLayout {
    tops: Vec<f32>,
    viewport_height: f32,
}

impl FixedLayout {
    pub fn new(tops: Vec<f32>, viewport_height: f32) -> Self {
        Self {
            tops,
            viewport_height,
        }
    }

    pub fn set_tops(&mut self, tops: Vec<f32>) {
        self.tops = tops;
    }
}

impl LayoutProvider for FixedLayout {
    fn segment_tops(&self) -> Vec<f32> {
        self.tops.clone()
    }

    fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    fn record_tops(&mut self, _tops: Vec<f32>) {}

    fn record_viewport_height(&mut self, _height: f32) {}
}

/// Layout fed by the renderer after each layout pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasuredLayout {
    tops: Vec<f32>,
    viewport_height: f32,
}

impl LayoutProvider for MeasuredLayout {
    fn segment_tops(&self) -> Vec<f32> {
        self.tops.clone()
    }

    fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    fn record_tops(&mut self, tops: Vec<f32>) {
        self.tops = tops;
    }

    fn record_viewport_height(&mut self, height: f32) {
        if height.is_finite() {
            self.viewport_height = height.max(0.0);
        }
    }
}

/// Non-decreasing offsets, one per visible entry in panel order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollMap {
    offsets: Vec<f32>,
}

impl ScrollMap {
    /// Split each segment's vertical space evenly among its visible entries.
    ///
    /// Segment `i` owns `[tops[i-1], tops[i])` (starting at 0 for the first
    /// segment). The last segment has nothing below it, so it gets
    /// `per_entry_height` per entry instead.
    pub fn build(segment_tops: &[f32], visible_counts: &[usize], per_entry_height: f32) -> Self {
        let tops = sanitize_tops(segment_tops);
        let total: usize = visible_counts.iter().take(tops.len()).sum();
        let mut offsets = Vec::with_capacity(total);

        for (i, &top) in tops.iter().enumerate() {
            let count = visible_counts.get(i).copied().unwrap_or(0);
            if count == 0 {
                continue;
            }
            let prev_top = if i == 0 { 0.0 } else { tops[i - 1] };
            let space = if i + 1 == tops.len() {
                per_entry_height.max(0.0) * count as f32
            } else {
                (top - prev_top).max(0.0)
            };
            let step = space / count as f32;
            offsets.extend((0..count).map(|k| prev_top + k as f32 * step));
        }

        Self { offsets }
    }

    pub fn offsets(&self) -> &[f32] {
        &self.offsets
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// First entry whose offset is strictly greater than `offset`.
    pub fn entry_at(&self, offset: f32) -> Option<usize> {
        let idx = self.offsets.partition_point(|&value| value <= offset);
        (idx < self.offsets.len()).then_some(idx)
    }

    /// Last entry whose offset is at or before `offset`.
    pub fn last_at_or_before(&self, offset: f32) -> Option<usize> {
        self.offsets
            .partition_point(|&value| value <= offset)
            .checked_sub(1)
    }
}

/// Visible entries per segment, keyed by each entry's leading anchor.
/// Anchors outside the rendered segments are clamped to the nearest one so
/// the map stays aligned with the panel list.
pub fn visible_counts_per_segment(
    entries: &[CommentaryEntry],
    outcome: &FilterOutcome,
    segment_count: usize,
) -> Vec<usize> {
    let mut counts = vec![0usize; segment_count];
    if segment_count == 0 {
        return counts;
    }
    for idx in outcome.visible_indices() {
        let Some(entry) = entries.get(idx) else {
            continue;
        };
        let segment = (entry.anchor.leading() as usize).clamp(1, segment_count);
        counts[segment - 1] += 1;
    }
    counts
}

/// Zero the counts outside the 1-based segment range `first..=last`.
pub fn restrict_counts(counts: &[usize], first: u32, last: u32) -> Vec<usize> {
    counts
        .iter()
        .enumerate()
        .map(|(i, &count)| {
            let segment = i as u32 + 1;
            if (first..=last).contains(&segment) {
                count
            } else {
                0
            }
        })
        .collect()
}

fn sanitize_tops(tops: &[f32]) -> Vec<f32> {
    let mut floor = 0.0f32;
    tops.iter()
        .map(|&top| {
            if top.is_finite() && top > floor {
                floor = top;
            }
            floor
        })
        .collect()
}
