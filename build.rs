use chrono::Utc;

fn main() {
    // Stamped into `--version` output.
    println!(
        "cargo:rustc-env=SCREEN_SLEEPER_BUILD_TIME={}",
        Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
    );
    println!("cargo:rerun-if-changed=build.rs");
}
