//! Terminal rendering of progress registry entries.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::task::JoinHandle;

use crate::progress::{ProgressRegistry, ProgressStatus};

const POLL_INTERVAL: Duration = Duration::from_millis(150);

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Mirror `key` from the registry onto a progress bar until `task` ends.
pub async fn follow<T>(
    registry: &ProgressRegistry,
    key: &str,
    mut task: JoinHandle<T>,
) -> Result<T, tokio::task::JoinError> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(spinner_style());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Starting {}...", key));
    let mut sized = false;

    let result = loop {
        tokio::select! {
            finished = &mut task => break finished,
            _ = tokio::time::sleep(POLL_INTERVAL) => {}
        }
        let Some(progress) = registry.get(key) else { continue };
        if progress.total > 0 {
            if !sized {
                pb.set_style(bar_style());
                sized = true;
            }
            pb.set_length(progress.total as u64);
            pb.set_position(progress.current as u64);
        }
        if let Some(item) = progress.current_item {
            pb.set_message(item);
        }
    };

    match registry.get(key).map(|p| p.status) {
        Some(ProgressStatus::Error) => pb.abandon_with_message("failed"),
        _ => pb.finish_and_clear(),
    }
    result
}
