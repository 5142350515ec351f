//! Client side of the task manager: an HTTP seam to the task API, the
//! filter/statistics view over a fetched list, and the board state that ties
//! them together.
pub mod api;
pub mod board;
pub mod view;

pub use api::{ClientError, HttpTaskApi, TaskApi};
pub use board::{BoardError, DraftError, TaskBoard, TaskDraft};
pub use view::{TaskFilter, TaskStats};
