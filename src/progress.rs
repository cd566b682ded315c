//! Progress reporting for the chunk loop.

use indicatif::{ProgressBar, ProgressStyle};

/// Build a row-count progress bar. When the total is unknown (streamed CSV)
/// a spinner-style counter is used instead.
pub fn row_bar(total_rows: Option<u64>) -> ProgressBar {
    match total_rows {
        Some(total) => {
            let bar = ProgressBar::new(total);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "[{elapsed_precise}] Rows: [{bar:30.green/blue}] {human_pos}/{human_len} ({percent}%) | {per_sec}",
                    )
                    .unwrap()
                    .progress_chars("=>-"),
            );
            bar
        }
        None => {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::default_spinner()
                    .template("[{elapsed_precise}] {spinner} Rows: {human_pos} | {per_sec}")
                    .unwrap(),
            );
            bar
        }
    }
}
