pub mod config;
pub mod contact;
pub mod counter;
pub mod dom;
pub mod lazy_images;
pub mod logging;
pub mod navigation;
pub mod outcome;
pub mod reveal;
pub mod scroll;
pub mod theme;
pub mod timer;
pub mod typing;

#[cfg(target_arch = "wasm32")]
mod frontend;

#[cfg(test)]
mod testing;

#[cfg(target_arch = "wasm32")]
pub use frontend::{run, Reactors, WebElement};
