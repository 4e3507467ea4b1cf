use indicatif::{ProgressBar as IndicatifProgressBar, ProgressStyle};
use rbi_ifsc::SourceLink;
use std::sync::Mutex;

/// Per-file progress for index builds.
///
/// The number of linked files is only known once the listing page has been
/// scraped, so the bar is created on the first callback.
pub struct BuildProgressBar {
    pb: Mutex<Option<IndicatifProgressBar>>,
}

impl BuildProgressBar {
    pub fn new() -> Self {
        Self { pb: Mutex::new(None) }
    }

    /// Callback shape expected by the index builder
    pub fn update(&self, current: usize, total: usize, link: &SourceLink) {
        let mut guard = self.pb.lock().unwrap_or_else(|e| e.into_inner());
        let pb = guard.get_or_insert_with(|| {
            let pb = IndicatifProgressBar::new(total as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:.cyan}/{len:.cyan} | {msg}")
            {
                pb.set_style(style.progress_chars("█▓▒░ "));
            }
            pb
        });
        pb.set_position(current as u64);
        pb.set_message(link.title.clone());
    }

    pub fn finish(&self) {
        let guard = self.pb.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(pb) = guard.as_ref() {
            pb.finish_and_clear();
        }
    }
}
