use terminal_size::{terminal_size, Width};

/// Width for clap's help output. Falls back to 100 columns when
/// stdout is not a terminal.
pub fn get_terminal_width() -> usize {
    if let Some((Width(width), _)) = terminal_size() {
        usize::from(width).saturating_sub(2).max(40)
    } else {
        100
    }
}
