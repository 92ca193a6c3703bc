use std::env;
use std::fs;
use std::path::Path;

// Кладёт config.toml из корня workspace рядом с бинарником,
// чтобы бэкенд нашёл его на старте (см. shared/config.rs).
fn main() {
    println!("cargo:rerun-if-changed=../../config.toml");

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let profile = env::var("PROFILE").expect("PROFILE is set by cargo");

    // OUT_DIR выглядит как target/<profile>/build/backend-xxx/out
    let out_path = Path::new(&out_dir);
    let target_dir = match out_path.ancestors().find(|p| p.ends_with(&profile)) {
        Some(dir) => dir,
        None => return,
    };

    let workspace_root = Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent());
    let Some(workspace_root) = workspace_root else {
        return;
    };

    let source_config = workspace_root.join("config.toml");
    if source_config.exists() {
        let dest_config = target_dir.join("config.toml");
        if let Err(e) = fs::copy(&source_config, &dest_config) {
            println!("cargo:warning=Failed to copy config.toml: {e}");
        }
    } else {
        println!(
            "cargo:warning=config.toml not found at {:?}, using default config",
            source_config
        );
    }
}
