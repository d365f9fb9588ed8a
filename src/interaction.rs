use std::fmt;
use std::rc::Rc;

use crate::defaults;
use crate::fonts::TextMeasure;
use crate::geometry::{ChartGeometry, Point};
use crate::model::{Ladder, LadderState, Offset};
use crate::style::ChartStyle;

/// Extra slack around label text when hit testing.
pub const LABEL_HIT_PADDING: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up(Point),
    Cancel,
}

/// Something on the surface a press can grab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    ValueHandle(usize),
    TopLabel(usize),
    LevelLabel { axis: usize, level: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    DraggingValue {
        axis: usize,
    },
    DraggingTopLabel {
        axis: usize,
        start: Point,
        start_offset: Offset,
    },
    DraggingLevelLabel {
        axis: usize,
        level: usize,
        start: Point,
        start_offset: Offset,
    },
}

impl DragState {
    pub fn is_idle(&self) -> bool {
        matches!(self, DragState::Idle)
    }
}

/// Receives pointer events outside the surface for as long as a drag is active.
pub trait InputCapture {
    fn capture(&self);
    fn release(&self);
}

/// Capture for surfaces that already see every pointer event.
#[derive(Debug, Default)]
pub struct NoCapture;

impl InputCapture for NoCapture {
    fn capture(&self) {}
    fn release(&self) {}
}

/// Holds pointer capture; releases it when dropped.
pub struct CaptureGuard {
    target: Rc<dyn InputCapture>,
}

impl CaptureGuard {
    pub fn acquire(target: Rc<dyn InputCapture>) -> Self {
        target.capture();
        Self { target }
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.target.release();
    }
}

impl fmt::Debug for CaptureGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CaptureGuard")
    }
}

/// Axis-aligned box centered on a label anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelBox {
    pub center: Point,
    pub half_width: f64,
    pub half_height: f64,
}

impl LabelBox {
    pub fn contains(&self, p: Point) -> bool {
        (p.x - self.center.x).abs() <= self.half_width
            && (p.y - self.center.y).abs() <= self.half_height
    }
}

fn label_box(measure: &mut dyn TextMeasure, text: &str, font_size: f32, bold: bool, center: Point) -> LabelBox {
    let (w, h) = measure.measure_text(text, font_size, bold);
    LabelBox {
        center,
        half_width: f64::from(w) / 2.0 + LABEL_HIT_PADDING,
        half_height: f64::from(h) / 2.0 + LABEL_HIT_PADDING,
    }
}

/// Resolves a press position to the element under it: value handles first, then level
/// labels, then top labels.
pub fn hit_test(
    geometry: &ChartGeometry,
    state: &LadderState,
    style: &ChartStyle,
    measure: &mut dyn TextMeasure,
    p: Point,
) -> Option<DragTarget> {
    let handles = geometry.value_polygon_points(&state.values);
    if let Some(axis) = handles
        .iter()
        .position(|h| h.distance(p) <= style.handle_radius)
    {
        return Some(DragTarget::ValueHandle(axis));
    }

    for axis in 0..state.axis_count() {
        let labels = state.level_label_row(axis);
        for (level, text) in labels.iter().enumerate() {
            let anchor = geometry.level_label_anchor(axis, level, state.level_label_offset(axis, level));
            if label_box(measure, text, style.level_label_font_size, false, anchor).contains(p) {
                return Some(DragTarget::LevelLabel { axis, level });
            }
        }
    }

    state.top_labels.iter().enumerate().find_map(|(axis, text)| {
        let anchor = geometry.top_label_anchor(axis, state.top_label_offset(axis));
        label_box(measure, text, style.top_label_font_size, true, anchor)
            .contains(p)
            .then_some(DragTarget::TopLabel(axis))
    })
}

/// The drag state machine. At most one drag is active; it owns the pointer capture for
/// its whole lifetime.
#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
    capture: Option<CaptureGuard>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        !self.state.is_idle()
    }

    /// Enters the drag state for `target`, acquiring capture from `capture`.
    /// Ignored while another drag is active.
    pub fn begin(
        &mut self,
        target: DragTarget,
        pointer: Point,
        ladder: &Ladder,
        capture: Rc<dyn InputCapture>,
    ) -> bool {
        if self.is_dragging() {
            log::debug!("drag: press on {:?} ignored, already {:?}", target, self.state);
            return false;
        }

        let state = ladder.state();
        self.state = match target {
            DragTarget::ValueHandle(axis) => DragState::DraggingValue { axis },
            DragTarget::TopLabel(axis) => DragState::DraggingTopLabel {
                axis,
                start: pointer,
                start_offset: state.top_label_offset(axis),
            },
            DragTarget::LevelLabel { axis, level } => DragState::DraggingLevelLabel {
                axis,
                level,
                start: pointer,
                start_offset: state.level_label_offset(axis, level),
            },
        };
        self.capture = Some(CaptureGuard::acquire(capture));
        log::debug!("drag: begin {:?}", self.state);
        true
    }

    /// Applies one pointer move to the store. No-op when idle.
    pub fn update(&mut self, pointer: Point, geometry: &ChartGeometry, ladder: &mut Ladder) {
        let result = match self.state {
            DragState::Idle => return,
            DragState::DraggingValue { axis } => {
                let value = defaults::normalize_value(geometry.raw_value_at(pointer));
                ladder.set_axis_value(axis, value)
            }
            DragState::DraggingTopLabel {
                axis,
                start,
                start_offset,
            } => ladder.set_top_label_offset(axis, start_offset + pointer.delta_from(start)),
            DragState::DraggingLevelLabel {
                axis,
                level,
                start,
                start_offset,
            } => ladder.set_level_label_offset(axis, level, start_offset + pointer.delta_from(start)),
        };

        // The axis set can shrink under an active drag (e.g. an import); end the drag then.
        if let Err(err) = result {
            log::warn!("drag: {}; ending {:?}", err, self.state);
            self.end();
        }
    }

    /// Returns to idle and drops the capture.
    pub fn end(&mut self) {
        if self.is_dragging() {
            log::debug!("drag: end {:?}", self.state);
        }
        self.state = DragState::Idle;
        self.capture = None;
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::CountingCapture;
    use super::*;
    use crate::defaults::LEVEL_COUNT;
    use crate::fonts::EstimatedMeasure;

    fn geometry() -> ChartGeometry {
        ChartGeometry::for_size(5, LEVEL_COUNT, 400.0)
    }

    #[test]
    fn value_drag_tracks_absolute_position() {
        let mut ladder = Ladder::default();
        let mut drag = DragController::new();
        let g = geometry();

        drag.begin(DragTarget::ValueHandle(0), Point::new(200.0, 104.0), &ladder, Rc::new(NoCapture));
        drag.update(Point::new(200.0, 200.0), &g, &mut ladder);
        assert_eq!(ladder.state().value(0), 1.0);

        drag.update(Point::new(200.0, -500.0), &g, &mut ladder);
        assert_eq!(ladder.state().value(0), 5.0);

        // 64px along the axis is exactly level 2, regardless of where the drag started
        drag.update(Point::new(200.0, 136.0), &g, &mut ladder);
        assert_eq!(ladder.state().value(0), 2.0);

        drag.update(Point::new(200.0 + 70.4, 200.0), &g, &mut ladder);
        assert_eq!(ladder.state().value(0), 2.2);
    }

    #[test]
    fn label_drag_is_relative_to_press() {
        let mut ladder = Ladder::default();
        ladder.set_top_label_offset(2, Offset::new(10.0, 10.0)).unwrap();
        let mut drag = DragController::new();
        let g = geometry();

        let start = Point::new(37.0, 91.0);
        drag.begin(DragTarget::TopLabel(2), start, &ladder, Rc::new(NoCapture));
        drag.update(Point::new(42.0, 88.0), &g, &mut ladder);
        assert_eq!(ladder.state().top_label_offset(2), Offset::new(15.0, 7.0));

        drag.update(Point::new(37.0, 91.0), &g, &mut ladder);
        assert_eq!(ladder.state().top_label_offset(2), Offset::new(10.0, 10.0));
    }

    #[test]
    fn level_label_drag_updates_one_cell() {
        let mut ladder = Ladder::default();
        let before = ladder.state().level_label_offset(3, 4);
        let mut drag = DragController::new();

        drag.begin(
            DragTarget::LevelLabel { axis: 3, level: 4 },
            Point::new(0.0, 0.0),
            &ladder,
            Rc::new(NoCapture),
        );
        drag.update(Point::new(-2.0, 6.0), &geometry(), &mut ladder);

        assert_eq!(
            ladder.state().level_label_offset(3, 4),
            before + Offset::new(-2.0, 6.0)
        );
        assert_eq!(
            ladder.state().level_label_offset(3, 3),
            LadderState::default().level_label_offset(3, 3)
        );
    }

    #[test]
    fn move_while_idle_is_a_no_op() {
        let mut ladder = Ladder::default();
        let before = ladder.state().clone();
        DragController::new().update(Point::new(1.0, 1.0), &geometry(), &mut ladder);
        assert_eq!(ladder.state(), &before);
    }

    #[test]
    fn capture_is_held_for_exactly_one_drag() {
        let ladder = Ladder::default();
        let capture = Rc::new(CountingCapture::default());
        let mut drag = DragController::new();

        assert!(drag.begin(DragTarget::ValueHandle(1), Point::default(), &ladder, capture.clone()));
        assert!(!drag.begin(DragTarget::TopLabel(0), Point::default(), &ladder, capture.clone()));
        assert_eq!(capture.captured.get(), 1);
        assert_eq!(drag.state(), DragState::DraggingValue { axis: 1 });

        drag.end();
        assert_eq!(capture.released.get(), 1);
        assert!(drag.state().is_idle());

        drag.end();
        assert_eq!(capture.released.get(), 1);
    }

    #[test]
    fn dropping_the_controller_releases_capture() {
        let ladder = Ladder::default();
        let capture = Rc::new(CountingCapture::default());
        {
            let mut drag = DragController::new();
            drag.begin(DragTarget::TopLabel(0), Point::default(), &ladder, capture.clone());
        }
        assert_eq!(capture.released.get(), 1);
    }

    #[test]
    fn hit_test_finds_handles_and_labels() {
        let ladder = Ladder::default();
        let state = ladder.state();
        let g = geometry();
        let style = ChartStyle::default();
        let mut measure = EstimatedMeasure;

        // axis 3 sits at value 5, so its handle is on the outline
        let handle = g.value_polygon_points(&state.values)[3];
        let near = Point::new(handle.x + 6.0, handle.y - 6.0);
        assert_eq!(
            hit_test(&g, state, &style, &mut measure, near),
            Some(DragTarget::ValueHandle(3))
        );

        let top = g.top_label_anchor(0, state.top_label_offset(0));
        assert_eq!(
            hit_test(&g, state, &style, &mut measure, top),
            Some(DragTarget::TopLabel(0))
        );

        let level = g.level_label_anchor(1, 4, state.level_label_offset(1, 4));
        assert_eq!(
            hit_test(&g, state, &style, &mut measure, level),
            Some(DragTarget::LevelLabel { axis: 1, level: 4 })
        );

        assert_eq!(
            hit_test(&g, state, &style, &mut measure, Point::new(399.0, 399.0)),
            None
        );
    }
}
