// build.rs

// Libraries the X11 driver needs: core Xlib for windows, events and GCs, Xft and
// Xrender for text, fontconfig and freetype behind Xft's font lookup.
const X_LIBRARIES: [&str; 5] = ["x11", "xrender", "xft", "fontconfig", "freetype2"];

// Linker names used when pkg-config can't describe the libraries.
const FALLBACK_LINK_NAMES: [&str; 5] = ["X11", "Xrender", "Xft", "fontconfig", "freetype"];

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // pkg-config is the normal path. If any probe fails, fall back to plain
    // link flags and hope the libraries sit in a standard search path.
    let missing: Vec<&str> = X_LIBRARIES
        .iter()
        .copied()
        .filter(|lib| pkg_config::probe_library(lib).is_err())
        .collect();

    if missing.is_empty() {
        eprintln!("pkg-config found all X11 drawing libraries.");
        return;
    }

    eprintln!(
        "pkg-config failed for {:?}. Falling back to manual linking.",
        missing
    );
    for name in FALLBACK_LINK_NAMES {
        println!("cargo:rustc-link-lib={}", name);
    }
    println!("cargo:rustc-link-search=/usr/lib");
    eprintln!(
        "Manual linking flags applied. Ensure X11, Xrender, Xft, fontconfig and freetype development libraries are installed."
    );
}
