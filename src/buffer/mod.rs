mod registry;
mod shared;
mod view;

pub use registry::{global, BufferRegistry};
pub use shared::{BufferGuard, BufferStorage, SharedBuffer};
pub use view::BufferView;
