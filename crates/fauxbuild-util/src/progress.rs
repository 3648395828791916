use std::io::Write;

use console::Style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Format a Cargo-style status line: `   Compiling serde v1.0.0`
///
/// The `label` is right-aligned to 12 columns and rendered in bold green.
pub fn status_line(label: &str, message: &str) -> String {
    let green_bold = Style::new().green().bold();
    format!("{:>12} {message}", green_bold.apply_to(label))
}

/// Print a Cargo-style status line to stderr.
pub fn status(label: &str, message: &str) {
    let _ = writeln!(std::io::stderr(), "{}", status_line(label, message));
}

/// Like [`status`] but uses bold cyan for informational (non-action) messages.
pub fn status_info(label: &str, message: &str) {
    let cyan_bold = Style::new().cyan().bold();
    let _ = writeln!(
        std::io::stderr(),
        "{:>12} {message}",
        cyan_bold.apply_to(label),
    );
}

/// Print a warning-style status line (bold yellow label).
pub fn status_warn(label: &str, message: &str) {
    let yellow_bold = Style::new().yellow().bold();
    let _ = writeln!(
        std::io::stderr(),
        "{:>12} {message}",
        yellow_bold.apply_to(label),
    );
}

/// Create the bottom `Building [===>   ] m/n: pkg, pkg` bar Cargo shows while compiling.
///
/// The bar draws to stderr and hides itself when stderr is not a terminal.
pub fn building_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(Some(len), ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{prefix:>12.cyan.bold} [{bar:27}] {pos}/{len}: {wide_msg}")
            .expect("valid template")
            .progress_chars("=> "),
    );
    pb.set_prefix("Building");
    pb
}
