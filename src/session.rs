use std::rc::Rc;

use crate::error::Result;
use crate::fonts::{EstimatedMeasure, TextMeasure};
use crate::geometry::{ChartGeometry, Point};
use crate::interaction::{DragController, DragState, DragTarget, InputCapture, PointerEvent, hit_test};
use crate::model::{Field, Ladder, LadderState, SubscriptionId};
use crate::snapshot::PartialSnapshot;
use crate::style::ChartStyle;

struct MountedSurface {
    size: f64,
    capture: Rc<dyn InputCapture>,
}

/// Owns the ladder store exclusively; every edit, import and drag goes through here.
pub struct EditorSession {
    ladder: Ladder,
    style: ChartStyle,
    measure: Box<dyn TextMeasure>,
    drag: DragController,
    surface: Option<MountedSurface>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(Ladder::default(), ChartStyle::default(), Box::new(EstimatedMeasure))
    }
}

impl EditorSession {
    pub fn new(ladder: Ladder, style: ChartStyle, measure: Box<dyn TextMeasure>) -> Self {
        Self {
            ladder,
            style,
            measure,
            drag: DragController::new(),
            surface: None,
        }
    }

    pub fn state(&self) -> &LadderState {
        self.ladder.state()
    }

    pub fn style(&self) -> &ChartStyle {
        &self.style
    }

    pub fn drag_state(&self) -> DragState {
        self.drag.state()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(Field, &LadderState) + 'static) -> SubscriptionId {
        self.ladder.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.ladder.unsubscribe(id)
    }

    /// Attaches a square surface of edge `size`. Pointer events are ignored until mounted.
    pub fn mount(&mut self, size: f64, capture: Rc<dyn InputCapture>) {
        self.unmount();
        log::debug!("session: surface mounted at {}px", size);
        self.surface = Some(MountedSurface { size, capture });
    }

    /// Detaches the surface, ending any drag and releasing its capture.
    pub fn unmount(&mut self) {
        self.drag.end();
        if self.surface.take().is_some() {
            log::debug!("session: surface unmounted");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.surface.is_some()
    }

    /// Current chart geometry, if a surface is mounted.
    pub fn geometry(&self) -> Option<ChartGeometry> {
        self.surface
            .as_ref()
            .map(|s| ChartGeometry::for_state(self.ladder.state(), s.size))
    }

    pub fn set_axis_label(&mut self, axis: usize, text: impl Into<String>) -> Result<()> {
        self.ladder.set_axis_label(axis, text)
    }

    pub fn set_axis_value(&mut self, axis: usize, raw: f64) -> Result<()> {
        self.ladder.set_axis_value(axis, raw)
    }

    pub fn set_level_label(&mut self, axis: usize, level: usize, text: impl Into<String>) -> Result<()> {
        self.ladder.set_level_label(axis, level, text)
    }

    /// Parses and applies an imported config. On error the state is unchanged.
    pub fn import_json(&mut self, content: &str) -> Result<()> {
        let snapshot = PartialSnapshot::from_json(content)?;
        self.ladder.replace_all(snapshot);
        Ok(())
    }

    pub fn export_json(&self) -> Result<String> {
        self.ladder.state().snapshot().to_json_pretty()
    }

    /// Starts a drag on a known target. No-op when unmounted or already dragging.
    pub fn press(&mut self, target: DragTarget, pointer: Point) -> bool {
        let Some(surface) = self.surface.as_ref() else {
            log::debug!("session: press on {:?} before mount ignored", target);
            return false;
        };
        let capture = Rc::clone(&surface.capture);
        self.drag.begin(target, pointer, &self.ladder, capture)
    }

    /// Hit-tests `pointer` and starts a drag on whatever is under it.
    pub fn pointer_down(&mut self, pointer: Point) -> Option<DragTarget> {
        let geometry = self.geometry()?;
        let target = hit_test(
            &geometry,
            self.ladder.state(),
            &self.style,
            self.measure.as_mut(),
            pointer,
        )?;
        self.press(target, pointer).then_some(target)
    }

    pub fn pointer_move(&mut self, pointer: Point) {
        if let Some(geometry) = self.geometry() {
            self.drag.update(pointer, &geometry, &mut self.ladder);
        }
    }

    pub fn pointer_up(&mut self) {
        self.drag.end();
    }

    pub fn handle_event(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down(p) => {
                self.pointer_down(p);
            }
            PointerEvent::Move(p) => self.pointer_move(p),
            PointerEvent::Up(_) | PointerEvent::Cancel => self.pointer_up(),
        }
    }
}
