//! Startup banner.

use crate::config::Settings;
use crate::consts::{AUTHOR, HOMEPAGE, REPO};

/// Render the startup banner for the given settings.
pub fn render_banner(settings: &Settings) -> String {
    format!(
        r#"
   ╔═══════════════════════════════════════╗
   ║             C O G I T O               ║
   ║      reasoning, one step at a time    ║
   ╚═══════════════════════════════════════╝

   version    {}
   by         {}
   home       {}
   repo       {}
   listening  {}
   openai     {}
   anthropic  {}
   pacing     {} ms/step, up to {} model steps
   timeout    {} s
"#,
        env!("CARGO_PKG_VERSION"),
        AUTHOR,
        HOMEPAGE,
        REPO,
        settings.ui_url(),
        settings.openai_url,
        settings.anthropic_url,
        settings.step_delay.as_millis(),
        settings.max_model_steps,
        settings.request_timeout.as_secs(),
    )
}

/// Print the startup banner.
pub fn print_banner(settings: &Settings) {
    println!("{}", render_banner(settings));
}
