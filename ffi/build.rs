use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/types.rs");

    let crate_dir = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let include_dir = PathBuf::from(&crate_dir).join("include");
    let _ = std::fs::create_dir_all(&include_dir);
    let header = include_dir.join("localpostman.h");

    // Array lengths are `usize`; C sees them as `size_t`.
    let config = cbindgen::Config {
        usize_is_size_t: true,
        ..Default::default()
    };

    // A header that fails to generate should not block building the library.
    match cbindgen::Builder::new()
        .with_config(config)
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("LOCALPOSTMAN_H")
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(header);
        }
        Err(e) => println!("cargo:warning=cbindgen: {e}"),
    }
}
