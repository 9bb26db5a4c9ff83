pub mod memory;
#[cfg(not(target_arch = "wasm32"))]
pub mod sqlite;
pub mod traits;
