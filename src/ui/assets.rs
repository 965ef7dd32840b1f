use std::sync::OnceLock;

use rust_embed::RustEmbed;

/// Embed the entire `assets/` directory into the binary.
#[derive(RustEmbed)]
#[folder = "assets"]
struct EmbeddedAssets;

static MAIN_CSS: OnceLock<String> = OnceLock::new();

/// Returns the contents of `assets/main.css` as a static string.
pub fn main_css() -> &'static str {
    MAIN_CSS.get_or_init(|| load_text("main.css")).as_str()
}

fn load_text(path: &str) -> String {
    let Some(file) = EmbeddedAssets::get(path) else {
        log::error!("embedded asset {path} is missing");
        return String::new();
    };
    String::from_utf8(file.data.into_owned()).unwrap_or_else(|_| {
        log::error!("embedded asset {path} is not valid UTF-8");
        String::new()
    })
}
