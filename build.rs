fn main() {
    let version = std::env::var("CARGO_PKG_VERSION").unwrap();
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| String::from("unknown"));

    println!("cargo:rustc-env=METRO_VERSION={}", version);
    println!("cargo:rustc-env=METRO_BUILD_PROFILE={}", profile);
    println!("cargo:rerun-if-changed=build.rs");
}
