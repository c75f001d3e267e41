#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("These reactors run in the browser. Run `trunk serve` or `trunk build --release`.");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    let _reactors = portfolio_reactors::run();
}
