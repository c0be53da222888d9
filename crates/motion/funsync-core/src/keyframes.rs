//! Sorted keyframe storage with binary search and a monotone cursor.
//!
//! Collections are built once (insertion-sorted, stable on ties) and frozen;
//! the engine replaces a collection wholesale via `Arc` swap instead of
//! mutating it in place, so the hot read path needs no locking.

use crate::interp::functions;
use crate::interp::InterpolationKind;

/// Segments whose position delta or value delta falls below this threshold
/// are treated as gaps (near-duplicate or near-instantaneous keyframes).
pub const GAP_THRESHOLD: f64 = 0.001;

/// One authored (time, value) control point. Position is in seconds,
/// value in [0,1]. Immutable once created.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Keyframe {
    pub position: f64,
    pub value: f64,
}

impl Keyframe {
    #[inline]
    pub fn new(position: f64, value: f64) -> Self {
        Self { position, value }
    }
}

/// Builder used while a script is being parsed; `build` freezes the
/// collection. `add` keeps the sequence sorted by position, with ties broken
/// by insertion order (stable insert point).
#[derive(Clone, Debug, Default)]
pub struct KeyframeCollectionBuilder {
    points: Vec<Keyframe>,
    is_raw: bool,
}

impl KeyframeCollectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the collection as a raw (unsmoothed, dense) recording.
    /// Raw collections always interpolate linearly.
    pub fn raw(mut self, is_raw: bool) -> Self {
        self.is_raw = is_raw;
        self
    }

    /// Insert a keyframe at its sorted position. Never fails. The insert
    /// point is an upper bound so equal positions keep insertion order.
    pub fn add(&mut self, keyframe: Keyframe) {
        let index = self
            .points
            .partition_point(|k| k.position <= keyframe.position);
        self.points.insert(index, keyframe);
    }

    pub fn build(self) -> KeyframeCollection {
        KeyframeCollection {
            points: self.points,
            is_raw: self.is_raw,
        }
    }
}

/// Frozen, position-ordered sequence of keyframes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyframeCollection {
    points: Vec<Keyframe>,
    is_raw: bool,
}

/// Insertion point for `position`: 0 before the first keyframe, `len` after
/// the last, the exact index on an exact match.
#[inline]
fn search_index_after(points: &[Keyframe], position: f64) -> usize {
    points.partition_point(|k| k.position < position)
}

impl KeyframeCollection {
    /// Build directly from (position, value) pairs, sorting as it goes.
    pub fn from_points<I>(points: I, is_raw: bool) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut builder = KeyframeCollectionBuilder::new().raw(is_raw);
        for (position, value) in points {
            builder.add(Keyframe::new(position, value));
        }
        builder.build()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn is_raw(&self) -> bool {
        self.is_raw
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Keyframe> {
        self.points.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Keyframe> + '_ {
        self.points.iter().copied()
    }

    /// See [`search_index_after`]: 0 if empty or `position` precedes the first
    /// keyframe, `len` if it exceeds the last, exact index on exact match.
    #[inline]
    pub fn search_index_after(&self, position: f64) -> usize {
        search_index_after(&self.points, position)
    }

    /// Index of the segment containing `position`; -1 when `position`
    /// precedes the whole collection.
    #[inline]
    pub fn search_index_before(&self, position: f64) -> i64 {
        self.search_index_after(position) as i64 - 1
    }

    /// Advance a previously known cursor forward (never backward) to the
    /// segment containing `position`. Amortized O(1) for monotonically
    /// increasing queries; produces the same index a fresh
    /// `search_index_before` would.
    pub fn advance_index(&self, index: i64, position: f64) -> i64 {
        let mut index = index.max(-1);
        loop {
            let next = index + 1;
            match self.get(next as usize) {
                Some(k) if k.position < position => index = next,
                _ => return index,
            }
        }
    }

    /// A segment is a gap when its position delta or value delta is below
    /// [`GAP_THRESHOLD`]. Out-of-range indices are not gaps.
    pub fn is_gap(&self, index: usize) -> bool {
        match (self.get(index), self.get(index + 1)) {
            (Some(a), Some(b)) => {
                (b.position - a.position).abs() < GAP_THRESHOLD
                    || (b.value - a.value).abs() < GAP_THRESHOLD
            }
            _ => false,
        }
    }

    /// Advance past consecutive gap segments starting at `index`.
    pub fn skip_gap(&self, index: usize) -> usize {
        let mut index = index;
        while self.is_gap(index) {
            index += 1;
        }
        index
    }

    /// Duration of the segment starting at `index`, or -1.0 when the segment
    /// does not exist.
    pub fn segment_duration(&self, index: usize) -> f64 {
        match (self.get(index), self.get(index + 1)) {
            (Some(a), Some(b)) => b.position - a.position,
            _ => -1.0,
        }
    }

    /// Fetch the keyframe at a possibly out-of-range index, synthesizing
    /// missing neighbors by reflecting the nearest real point across the
    /// collection boundary: `2 * edge - inner`. Keeps derivative continuity
    /// reasonable at the edges without lookahead data.
    fn take(&self, index: i64) -> Keyframe {
        let len = self.points.len() as i64;
        debug_assert!(len > 0);
        if (0..len).contains(&index) {
            return self.points[index as usize];
        }
        let (edge, inner) = if index < 0 {
            (0, (-index).min(len - 1))
        } else {
            let last = len - 1;
            (last, (2 * last - index).max(0))
        };
        let edge = self.points[edge as usize];
        let inner = self.points[inner as usize];
        Keyframe::new(
            2.0 * edge.position - inner.position,
            2.0 * edge.value - inner.value,
        )
    }

    /// Interpolate at `position` within the segment starting at `index`,
    /// using `kind` unless the collection is raw (which forces Linear).
    /// The caller must ensure `index` and `index + 1` are in range.
    pub fn interpolate(&self, index: usize, position: f64, kind: InterpolationKind) -> f64 {
        let kind = if self.is_raw {
            InterpolationKind::Linear
        } else {
            kind
        };
        let i = index as i64;
        match kind {
            InterpolationKind::Step => functions::step(self.points[index]),
            InterpolationKind::Linear => {
                functions::linear(self.points[index], self.points[index + 1], position)
            }
            InterpolationKind::Pchip => functions::pchip(
                [
                    self.take(i - 1),
                    self.take(i),
                    self.take(i + 1),
                    self.take(i + 2),
                ],
                position,
            ),
            InterpolationKind::Makima => functions::makima(
                [
                    self.take(i - 2),
                    self.take(i - 1),
                    self.take(i),
                    self.take(i + 1),
                    self.take(i + 2),
                    self.take(i + 3),
                ],
                position,
            ),
        }
    }
}
