/// Progress reporting for multi-archive batches
use indicatif::{ProgressBar, ProgressStyle};

/// Create a standard progress bar with consistent styling
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} archives ({elapsed})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━━─");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}

/// Create a hidden progress bar that doesn't display anything
pub fn create_hidden_progress_bar() -> ProgressBar {
    ProgressBar::hidden()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_progress_bar() {
        let pb = create_hidden_progress_bar();
        pb.inc(1);
        assert!(pb.is_hidden());
        assert_eq!(pb.position(), 1);
    }

    #[test]
    fn test_progress_bar_tracks_position() {
        let pb = create_progress_bar(3, "Deduplicating");
        pb.inc(2);
        assert_eq!(pb.position(), 2);
        assert_eq!(pb.length(), Some(3));
    }
}
