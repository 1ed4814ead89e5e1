//! Build script for smartapi-sys FFI bindings.
//!
//! Generates Rust declarations for the vendor `smartapi.h` header using
//! bindgen. It supports two modes:
//!
//! 1. With `smartapi-sdk` feature: Generates bindings from the shipped header
//!    and links the vendor library
//! 2. Without feature: Emits panic stubs so the workspace builds and tests
//!    without the vendor library

use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=wrapper.h");
    println!("cargo:rerun-if-changed=include/smartapi.h");
    println!("cargo:rerun-if-env-changed=SMARTAPI_LIB_DIR");

    #[cfg(feature = "smartapi-sdk")]
    generate_bindings();

    #[cfg(not(feature = "smartapi-sdk"))]
    generate_dummy_bindings();

    #[cfg(feature = "smartapi-sdk")]
    {
        if let Ok(dir) = env::var("SMARTAPI_LIB_DIR") {
            println!("cargo:rustc-link-search=native={}", dir);
        } else {
            // The vendor installer drops the library next to the front-end binaries
            for path in ["/usr/local/lib", "/usr/lib"] {
                if std::path::Path::new(path).join("libsmartapi.so").exists() {
                    println!("cargo:rustc-link-search=native={}", path);
                    break;
                }
            }
        }
        println!("cargo:rustc-link-lib=smartapi");
    }
}

#[cfg(feature = "smartapi-sdk")]
fn generate_bindings() {
    // The structs are declared by hand in lib.rs so both modes share one
    // layout; bindgen only contributes the function prototypes.
    let bindings = bindgen::Builder::default()
        .header("wrapper.h")
        .allowlist_function("Smart.*")
        .blocklist_type("smart_device")
        .blocklist_type("smart_dev")
        .blocklist_type("smart_info")
        .blocklist_type("smart_input")
        .blocklist_type("wchar_t")
        .generate_comments(true)
        .parse_callbacks(Box::new(bindgen::CargoCallbacks::new()))
        .generate()
        .expect("Unable to generate smartapi bindings");

    let out_path = PathBuf::from(env::var("OUT_DIR").unwrap());
    bindings
        .write_to_file(out_path.join("bindings.rs"))
        .expect("Couldn't write bindings!");
}

/// Generate stub bindings when the vendor library is not available.
/// This allows the crate to compile on systems without smartapi installed.
#[cfg(not(feature = "smartapi-sdk"))]
fn generate_dummy_bindings() {
    let out_path = PathBuf::from(env::var("OUT_DIR").unwrap());
    let dummy = r#"
// Dummy bindings - smartapi-sdk feature not enabled
//
// Each entry point links but panics when called. Enable the `smartapi-sdk`
// feature to bind the real vendor library.

const SMARTAPI_SDK_PANIC_MSG: &str = "smartapi function called but smartapi-sdk feature is not enabled. \
    Enable the smartapi-sdk feature (or hardware in smartasd-driver) to use the vendor driver.";

#[no_mangle]
pub unsafe extern "C" fn SmartScan() -> *mut smart_info {
    panic!("{}", SMARTAPI_SDK_PANIC_MSG);
}

#[no_mangle]
pub unsafe extern "C" fn SmartName(_device: smart_dev) -> *mut wchar_t {
    panic!("{}", SMARTAPI_SDK_PANIC_MSG);
}

#[no_mangle]
pub unsafe extern "C" fn SmartOpen(_device: smart_dev) -> i32 {
    panic!("{}", SMARTAPI_SDK_PANIC_MSG);
}

#[no_mangle]
pub unsafe extern "C" fn SmartClose(_device: smart_dev) {
    panic!("{}", SMARTAPI_SDK_PANIC_MSG);
}

#[no_mangle]
pub unsafe extern "C" fn SmartSetAll(_device: smart_dev, _state: u32, _mask: u32) -> i32 {
    panic!("{}", SMARTAPI_SDK_PANIC_MSG);
}

#[no_mangle]
pub unsafe extern "C" fn SmartSetSingle(_device: smart_dev, _channel: i32, _state: i32) -> i32 {
    panic!("{}", SMARTAPI_SDK_PANIC_MSG);
}

#[no_mangle]
pub unsafe extern "C" fn SmartGetAll(
    _device: smart_dev,
    _state: *mut smart_input,
    _timeout: i32,
) -> i32 {
    panic!("{}", SMARTAPI_SDK_PANIC_MSG);
}
"#;

    std::fs::write(out_path.join("bindings.rs"), dummy).expect("Couldn't write dummy bindings!");
}
