pub mod defaults;
pub mod error;
pub mod fonts;
pub mod geometry;
pub mod interaction;
pub mod model;
pub mod raster;
pub mod render;
pub mod session;
pub mod snapshot;
pub mod style;
pub mod svg;

pub use error::{LadderError, Result};
pub use geometry::{ChartGeometry, Point};
pub use interaction::{DragState, DragTarget, InputCapture, PointerEvent};
pub use model::{Field, Ladder, LadderState, Offset};
pub use render::ChartRenderer;
pub use session::EditorSession;
pub use snapshot::{ConfigSnapshot, PartialSnapshot};
pub use style::ChartStyle;
