use std::borrow::Cow;
use std::ops::{Add, Sub};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::defaults::{self, LEVEL_COUNT, MIN_VALUE};
use crate::error::{LadderError, Result};
use crate::snapshot::{ConfigSnapshot, PartialSnapshot};

/// A screen-space displacement in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

impl Offset {
    pub const ZERO: Offset = Offset { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Offset {
    type Output = Offset;

    fn add(self, rhs: Offset) -> Offset {
        Offset::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Offset {
    type Output = Offset;

    fn sub(self, rhs: Offset) -> Offset {
        Offset::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Identifies the collection touched by a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    TopLabels,
    Values,
    LevelLabels,
    TopLabelOffsets,
    LevelLabelOffsets,
}

pub type Row<T> = Rc<Vec<T>>;
pub type Table<T> = Rc<Vec<Row<T>>>;

/// Immutable view of everything the chart is derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct LadderState {
    pub top_labels: Row<String>,
    pub values: Row<f64>,
    pub level_labels: Table<String>,
    pub top_label_offsets: Row<Offset>,
    pub level_label_offsets: Table<Offset>,
}

impl Default for LadderState {
    fn default() -> Self {
        Self {
            top_labels: Rc::new(defaults::TOP_LABELS.iter().map(|s| s.to_string()).collect()),
            values: Rc::new(defaults::VALUES.to_vec()),
            level_labels: Rc::new(
                defaults::LEVEL_LABELS
                    .iter()
                    .map(|row| Rc::new(row.iter().map(|s| s.to_string()).collect()))
                    .collect(),
            ),
            top_label_offsets: Rc::new(defaults::TOP_LABEL_OFFSETS.to_vec()),
            level_label_offsets: Rc::new(
                defaults::LEVEL_LABEL_OFFSETS
                    .iter()
                    .map(|row| Rc::new(row.to_vec()))
                    .collect(),
            ),
        }
    }
}

impl LadderState {
    /// Number of axes. Every other collection is read relative to this.
    pub fn axis_count(&self) -> usize {
        self.top_labels.len()
    }

    pub fn value(&self, axis: usize) -> f64 {
        self.values.get(axis).copied().unwrap_or(MIN_VALUE)
    }

    /// Level labels for `axis`; a missing or wrong-length row reads as the placeholder row.
    pub fn level_label_row(&self, axis: usize) -> Cow<'_, [String]> {
        match self.level_labels.get(axis) {
            Some(row) if row.len() == LEVEL_COUNT => Cow::Borrowed(row.as_slice()),
            _ => Cow::Owned(defaults::fallback_level_labels()),
        }
    }

    pub fn top_label_offset(&self, axis: usize) -> Offset {
        self.top_label_offsets
            .get(axis)
            .copied()
            .unwrap_or(Offset::ZERO)
    }

    /// Offsets for `axis`; a missing or wrong-length row reads as all zeros.
    pub fn level_label_offset_row(&self, axis: usize) -> Cow<'_, [Offset]> {
        match self.level_label_offsets.get(axis) {
            Some(row) if row.len() == LEVEL_COUNT => Cow::Borrowed(row.as_slice()),
            _ => Cow::Owned(vec![Offset::ZERO; LEVEL_COUNT]),
        }
    }

    pub fn level_label_offset(&self, axis: usize, level: usize) -> Offset {
        self.level_label_offset_row(axis)
            .get(level)
            .copied()
            .unwrap_or(Offset::ZERO)
    }

    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            top_labels: self.top_labels.to_vec(),
            values: self.values.to_vec(),
            level_labels: self.level_labels.iter().map(|r| r.to_vec()).collect(),
            top_label_offsets: self.top_label_offsets.to_vec(),
            level_label_offsets: self.level_label_offsets.iter().map(|r| r.to_vec()).collect(),
        }
    }

    fn check_axis(&self, axis: usize) -> Result<()> {
        if axis < self.axis_count() {
            Ok(())
        } else {
            Err(LadderError::axis(axis, self.axis_count()))
        }
    }

    fn check_level(&self, axis: usize, level: usize) -> Result<()> {
        self.check_axis(axis)?;
        if level < LEVEL_COUNT {
            Ok(())
        } else {
            Err(LadderError::level(level, LEVEL_COUNT))
        }
    }
}

/// Handle returned by [`Ladder::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(Field, &LadderState)>;

/// Observable store. All mutation goes through the typed setters.
pub struct Ladder {
    state: LadderState,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: u64,
}

impl Default for Ladder {
    fn default() -> Self {
        Self::new(LadderState::default())
    }
}

impl std::fmt::Debug for Ladder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ladder")
            .field("state", &self.state)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Ladder {
    pub fn new(state: LadderState) -> Self {
        Self {
            state,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn state(&self) -> &LadderState {
        &self.state
    }

    pub fn subscribe(&mut self, callback: impl FnMut(Field, &LadderState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    fn publish(&mut self, field: Field) {
        log::debug!("ladder: {:?} changed", field);
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(field, &self.state);
        }
    }

    pub fn set_axis_label(&mut self, axis: usize, text: impl Into<String>) -> Result<()> {
        self.state.check_axis(axis)?;
        let mut labels = self.state.top_labels.to_vec();
        labels[axis] = text.into();
        self.state.top_labels = Rc::new(labels);
        self.publish(Field::TopLabels);
        Ok(())
    }

    /// Stores `raw` clamped to the level range and rounded to a tenth.
    pub fn set_axis_value(&mut self, axis: usize, raw: f64) -> Result<()> {
        self.state.check_axis(axis)?;
        let mut values = self.state.values.to_vec();
        if values.len() <= axis {
            values.resize(axis + 1, MIN_VALUE);
        }
        values[axis] = defaults::normalize_value(raw);
        self.state.values = Rc::new(values);
        self.publish(Field::Values);
        Ok(())
    }

    pub fn set_level_label(
        &mut self,
        axis: usize,
        level: usize,
        text: impl Into<String>,
    ) -> Result<()> {
        self.state.check_level(axis, level)?;
        let mut row = self.state.level_label_row(axis).into_owned();
        row[level] = text.into();
        self.state.level_labels = replace_row(
            &self.state.level_labels,
            axis,
            self.state.axis_count(),
            Rc::new(row),
            || Rc::new(defaults::fallback_level_labels()),
        );
        self.publish(Field::LevelLabels);
        Ok(())
    }

    pub fn set_top_label_offset(&mut self, axis: usize, offset: Offset) -> Result<()> {
        self.state.check_axis(axis)?;
        let mut offsets = self.state.top_label_offsets.to_vec();
        if offsets.len() < self.state.axis_count() {
            offsets.resize(self.state.axis_count(), Offset::ZERO);
        }
        offsets[axis] = offset;
        self.state.top_label_offsets = Rc::new(offsets);
        self.publish(Field::TopLabelOffsets);
        Ok(())
    }

    pub fn set_level_label_offset(&mut self, axis: usize, level: usize, offset: Offset) -> Result<()> {
        self.state.check_level(axis, level)?;
        let mut row = self.state.level_label_offset_row(axis).into_owned();
        row[level] = offset;
        self.state.level_label_offsets = replace_row(
            &self.state.level_label_offsets,
            axis,
            self.state.axis_count(),
            Rc::new(row),
            || Rc::new(vec![Offset::ZERO; LEVEL_COUNT]),
        );
        self.publish(Field::LevelLabelOffsets);
        Ok(())
    }

    /// Applies the fields present in `snapshot`, leaving the rest untouched.
    pub fn replace_all(&mut self, snapshot: PartialSnapshot) {
        let PartialSnapshot {
            top_labels,
            values,
            level_labels,
            top_label_offsets,
            level_label_offsets,
        } = snapshot;

        if let Some(labels) = top_labels {
            self.state.top_labels = Rc::new(labels);
            self.publish(Field::TopLabels);
        }
        if let Some(values) = values {
            self.state.values = Rc::new(values.into_iter().map(defaults::normalize_value).collect());
            self.publish(Field::Values);
        }
        if let Some(rows) = level_labels {
            self.state.level_labels = Rc::new(rows.into_iter().map(Rc::new).collect());
            self.publish(Field::LevelLabels);
        }
        if let Some(offsets) = top_label_offsets {
            self.state.top_label_offsets = Rc::new(offsets);
            self.publish(Field::TopLabelOffsets);
        }
        if let Some(rows) = level_label_offsets {
            self.state.level_label_offsets = Rc::new(rows.into_iter().map(Rc::new).collect());
            self.publish(Field::LevelLabelOffsets);
        }

        warn_on_shape_mismatch(&self.state);
    }
}

/// Rebuilds the outer table with `row` at `axis`, padding short tables up to `axis_count`.
/// Rows other than `axis` are shared with `table`.
fn replace_row<T>(
    table: &Table<T>,
    axis: usize,
    axis_count: usize,
    row: Row<T>,
    filler: impl Fn() -> Row<T>,
) -> Table<T> {
    let mut rows: Vec<Row<T>> = table.iter().cloned().collect();
    while rows.len() < axis_count {
        rows.push(filler());
    }
    rows[axis] = row;
    Rc::new(rows)
}

fn warn_on_shape_mismatch(state: &LadderState) {
    let n = state.axis_count();
    if state.values.len() != n {
        log::warn!("imported {} values for {} axes", state.values.len(), n);
    }
    if state.level_labels.len() != n || state.level_labels.iter().any(|r| r.len() != LEVEL_COUNT) {
        log::warn!("imported level labels do not match {}x{}; using placeholders", n, LEVEL_COUNT);
    }
    if state.top_label_offsets.len() != n {
        log::warn!("imported {} top label offsets for {} axes", state.top_label_offsets.len(), n);
    }
    if state.level_label_offsets.len() != n
        || state.level_label_offsets.iter().any(|r| r.len() != LEVEL_COUNT)
    {
        log::warn!("imported level label offsets do not match {}x{}; using zeros", n, LEVEL_COUNT);
    }
}
