//! Build script for the storefront crate.
//!
//! Fingerprints the stylesheet and the status-message script so templates
//! can reference `static/<kind>/derived/<name>.<hash>.<ext>` and the files
//! can be cached forever.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

/// A static asset to fingerprint.
struct Asset {
    /// Path under `static/`.
    path: &'static str,
    /// Compile-time variable receiving the hash.
    env_var: &'static str,
}

const ASSETS: &[Asset] = &[
    Asset {
        path: "css/main.css",
        env_var: "CSS_HASH",
    },
    Asset {
        path: "js/status-message.js",
        env_var: "JS_HASH",
    },
];

/// Length of the hex digest prefix used in file names.
const HASH_LEN: usize = 8;

fn main() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let static_dir = Path::new(&manifest_dir).join("static");

    for asset in ASSETS {
        let hash = fingerprint(&static_dir, asset).unwrap_or_default();
        println!("cargo:rustc-env={}={hash}", asset.env_var);
    }
}

/// Copy the asset next to itself under `derived/` with its hash in the name.
///
/// Returns `None` (templates then link the plain file) if the asset is
/// missing or the copy fails.
fn fingerprint(static_dir: &Path, asset: &Asset) -> Option<String> {
    let source = static_dir.join(asset.path);
    println!("cargo:rerun-if-changed={}", source.display());

    let content = match fs::read(&source) {
        Ok(content) => content,
        Err(e) => {
            println!("cargo:warning=Could not read {}: {e}", asset.path);
            return None;
        }
    };

    let digest = format!("{:x}", Sha256::digest(&content));
    let hash = digest.get(..HASH_LEN)?.to_owned();

    let stem = source.file_stem()?.to_str()?;
    let ext = source.extension()?.to_str()?;
    let derived_dir = source.parent()?.join("derived");

    let copied = fs::create_dir_all(&derived_dir)
        .and_then(|()| fs::copy(&source, derived_dir.join(format!("{stem}.{hash}.{ext}"))));
    if let Err(e) = copied {
        println!("cargo:warning=Could not write derived {}: {e}", asset.path);
        return None;
    }

    Some(hash)
}
