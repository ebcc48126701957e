mod progress;

pub use progress::{attach_progress_bar, batch_progress_bar, detach_progress_bar, LogWriterFactory};
