//! Speech host implementations

pub mod fake;
pub mod native;

pub use fake::FakeHost;
pub use native::NativeHost;
