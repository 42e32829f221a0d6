pub mod buffer;
pub mod engine;
pub mod writer;

pub use buffer::{BufferRegistry, BufferStorage, BufferView, SharedBuffer};
pub use engine::{BufferSpec, Recorder, RecorderPatch};
pub use writer::{WriteHead, MAX_CHANNELS};

#[cfg(feature = "wasm")]
pub use engine::wasm::TapeheadHandle;
