mod demo;
mod refresh;
mod scheduler;
mod shown;
mod state;
mod viewport;

pub use demo::{DemoAction, DemoRunner};
pub use refresh::{RefreshEvent, RefreshLoop};
pub use scheduler::{EntryStatus, FlowDirection, SchedulerConfig};
pub use shown::FileShownStore;
#[cfg(test)]
pub use shown::{ShownStore, StoreError};
pub use state::{Action, EngineState, Frame, FrameNode, Highlight};
pub use viewport::ViewTransform;
