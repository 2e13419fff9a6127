//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `stockpile_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("stockpile_core ping={}", stockpile_core::ping());
    println!("stockpile_core version={}", stockpile_core::core_version());
}
