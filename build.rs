#[cfg(target_os = "windows")]
compile_error!("asi-capture does not support Windows");

fn main() {
    println!("cargo:rerun-if-changed=include/wrapper.h");
    println!("cargo:rerun-if-env-changed=ASI_SDK_INCLUDE_DIR");
    println!("cargo:rerun-if-env-changed=ASI_SDK_LIB_DIR");

    // Without the SDK the library only carries the AsiSdk trait and its mock.
    #[cfg(feature = "sdk")]
    link_sdk();
}

#[cfg(feature = "sdk")]
fn link_sdk() {
    use std::{env, path::PathBuf};

    let header = PathBuf::from("include")
        .canonicalize()
        .expect("cannot canonicalize include path")
        .join("wrapper.h");
    let header = header.to_str().expect("Path is not a valid string");

    if let Ok(libdir) = env::var("ASI_SDK_LIB_DIR") {
        println!("cargo:rustc-link-search={}", libdir);
    } else {
        // Find ASICamera2 in LD_LIBRARY_PATH on Linux. This is not an issue on macOS.
        #[cfg(target_os = "linux")]
        {
            let libdir = env::var("LD_LIBRARY_PATH").unwrap_or_else(|_| {
                panic!(
                    "Neither ASI_SDK_LIB_DIR nor LD_LIBRARY_PATH is set. Point one of them at the directory containing ASICamera2."
                )
            });
            for path in libdir.split(':').filter(|x| !x.is_empty()) {
                println!("cargo:rustc-link-search={}", path);
            }
        }
    }
    println!("cargo:rustc-link-lib=static=ASICamera2");
    println!("cargo:rustc-link-lib=pthread");
    println!("cargo:rustc-link-lib=m");
    println!("cargo:rustc-link-lib=usb-1.0");
    #[cfg(target_os = "linux")]
    println!("cargo:rustc-link-lib=stdc++");
    #[cfg(target_os = "macos")]
    println!("cargo:rustc-link-lib=c++");

    let mut builder = bindgen::Builder::default()
        .header(header)
        .allowlist_function("ASI.*")
        .allowlist_type("ASI_.*")
        .allowlist_var("ASI_.*")
        .parse_callbacks(Box::new(bindgen::CargoCallbacks::new()));
    if let Ok(incdir) = env::var("ASI_SDK_INCLUDE_DIR") {
        builder = builder.clang_arg(format!("-I{}", incdir));
    }
    let bindings = builder.generate().expect("Unable to generate bindings");

    let out_path = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    bindings
        .write_to_file(out_path.join("bindings.rs"))
        .expect("Couldn't write bindings!");
}
