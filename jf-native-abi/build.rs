//! Build script for jf-native-abi
//!
//! Generates the C header `jf_native_abi.h` using cbindgen. The header is
//! written to OUT_DIR and, when an `include/` directory exists next to this
//! manifest, copied there for packaging.

use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src/");
    println!("cargo:rerun-if-changed=cbindgen.toml");

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set");
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");

    generate_header(&manifest_dir, &out_dir);
}

/// Generate C header using cbindgen
fn generate_header(manifest_dir: &str, out_dir: &str) {
    let crate_dir = PathBuf::from(manifest_dir);
    let config_path = crate_dir.join("cbindgen.toml");

    let header_out = PathBuf::from(out_dir).join("jf_native_abi.h");
    let include_dir = crate_dir.join("include");

    let config = if config_path.exists() {
        cbindgen::Config::from_file(&config_path).unwrap_or_default()
    } else {
        cbindgen::Config::default()
    };

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(&header_out);
            println!("cargo:info=Generated header: {}", header_out.display());

            if include_dir.exists() {
                let packaged = include_dir.join("jf_native_abi.h");
                bindings.write_to_file(&packaged);
                println!("cargo:info=Copied header to: {}", packaged.display());
            }
        }
        Err(e) => {
            println!("cargo:warning=cbindgen failed: {}", e);
            create_fallback_header(out_dir);
        }
    }
}

/// Create a minimal fallback header if cbindgen fails
fn create_fallback_header(out_dir: &str) {
    let header_content = r#"
#ifndef JF_NATIVE_ABI_H
#define JF_NATIVE_ABI_H

#include <stdint.h>
#include <stddef.h>

// Note: This is a fallback header. Build with cbindgen for full API.

typedef struct JfNativeBuffer {
    uint8_t *ptr;
    size_t len;
} JfNativeBuffer;

int32_t jf_native_healthcheck(void);
void jf_native_init_logging(void);
const char *jf_native_get_version(void);
void jf_native_free_buffer(uint8_t *ptr, size_t len);

int32_t jf_native_normalize_ffprobe_json(const uint8_t *input_ptr, size_t input_len,
                                         JfNativeBuffer *output, JfNativeBuffer *error);
int32_t jf_native_parse_keyframe_csv(const uint8_t *input_ptr, size_t input_len,
                                     JfNativeBuffer *output, JfNativeBuffer *error);

#endif // JF_NATIVE_ABI_H
"#;

    let header_path = PathBuf::from(out_dir).join("jf_native_abi.h");
    std::fs::write(&header_path, header_content).expect("Failed to write fallback header");
    println!("cargo:info=Created fallback header: {}", header_path.display());
}
