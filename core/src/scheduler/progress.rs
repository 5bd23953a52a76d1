use indicatif::{ProgressBar, ProgressStyle};

/// Visual progress for human-readable runs. Hidden entirely in JSON mode so
/// machine consumers see nothing but the report on stdout.
pub struct ProgressMonitor {
    overall: ProgressBar,
    enabled: bool,
}

impl ProgressMonitor {
    pub fn new(total_tasks: usize, enabled: bool) -> Self {
        if !enabled {
            return Self {
                overall: ProgressBar::hidden(),
                enabled: false,
            };
        }

        let overall = ProgressBar::new(total_tasks as u64);
        let style = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} tasks {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        overall.set_style(style);
        overall.set_message("running");

        Self {
            overall,
            enabled: true,
        }
    }

    pub fn task_done(&self, scope: &str, id: &str, ok: bool) {
        if !self.enabled {
            return;
        }
        self.overall.inc(1);
        let marker = if ok { "ok" } else { "FAIL" };
        self.overall.set_message(format!("{scope}/{id} {marker}"));
    }

    pub fn finish(&self, all_ok: bool) {
        if !self.enabled {
            return;
        }
        if all_ok {
            self.overall.finish_with_message("all tasks passed");
        } else {
            self.overall.finish_with_message("failures detected");
        }
    }
}
