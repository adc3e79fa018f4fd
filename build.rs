use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use syntect::dumps::dump_to_uncompressed_file;
use syntect::highlighting::ThemeSet;
use syntect::html::{ClassStyle, css_for_theme_with_class_style};
use two_face::syntax;
use walkdir::WalkDir;

const SYNTAX_THEME: &str = "base16-ocean.dark";

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));

    write_syntax_pack(&out_dir).expect("failed to write syntax pack");
    write_theme_css(&out_dir).expect("failed to write syntax theme stylesheet");

    let templates_dir = Path::new("templates");
    println!("cargo:rerun-if-changed={}", templates_dir.display());
    if templates_dir.is_dir() {
        for entry in WalkDir::new(templates_dir).into_iter().flatten() {
            println!("cargo:rerun-if-changed={}", entry.path().display());
        }
    }
}

fn write_theme_css(out_dir: &Path) -> Result<(), String> {
    let theme_set = ThemeSet::load_defaults();
    let theme = theme_set
        .themes
        .get(SYNTAX_THEME)
        .ok_or_else(|| format!("theme `{SYNTAX_THEME}` not found"))?;

    let css = css_for_theme_with_class_style(theme, ClassStyle::SpacedPrefixed { prefix: "syntax-" })
        .map_err(|err| err.to_string())?;

    let css_path = out_dir.join("syntax-theme.css");
    let mut combined = String::with_capacity(css.len() + 96);
    combined.push_str(&format!(
        "/* --- Syntect theme ({SYNTAX_THEME}), generated at build time --- */\n"
    ));
    combined.push_str(&css);

    fs::write(&css_path, combined)
        .map_err(|err| format!("failed to write {}: {err}", css_path.display()))?;

    println!(
        "cargo:rustc-env=SYNTAX_THEME_CSS_FILE={}",
        css_path.display()
    );

    Ok(())
}

fn write_syntax_pack(out_dir: &Path) -> Result<(), String> {
    let syntax_set = syntax::extra_newlines();
    let pack_path = out_dir.join("syntaxes.packdump");
    dump_to_uncompressed_file(&syntax_set, &pack_path)
        .map_err(|err| format!("failed to encode syntax set: {err}"))?;

    println!("cargo:rustc-env=SYNTAX_PACK_FILE={}", pack_path.display());

    Ok(())
}
