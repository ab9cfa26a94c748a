//! Core value types shared by the engine and the object model

pub mod color;
pub mod handle;

pub use color::Color;
pub use handle::Handle;
