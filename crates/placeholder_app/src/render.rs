use placeholder_core::{AppViewModel, PreviewState, QueueRowView};

/// Prints a status line whenever the visible status or progress changes.
#[derive(Default)]
pub struct TerminalRenderer {
    last: Option<String>,
}

impl TerminalRenderer {
    pub fn render(&mut self, view: &AppViewModel) {
        let line = status_line(view);
        if self.last.as_deref() != Some(line.as_str()) {
            println!("{line}");
            self.last = Some(line);
        }
    }
}

pub fn status_line(view: &AppViewModel) -> String {
    if view.progress.total == 0 {
        view.status.clone()
    } else {
        format!(
            "[{}/{}] {}",
            view.progress.current, view.progress.total, view.status
        )
    }
}

pub fn queue_listing(view: &AppViewModel) -> Vec<String> {
    let mut lines: Vec<String> = view.items.iter().map(queue_row).collect();
    lines.push(format!(
        "{} item(s), {} skipped",
        view.item_count, view.skipped_count
    ));
    lines
}

fn queue_row(row: &QueueRowView) -> String {
    let mark = if row.skip { "skip" } else { "    " };
    let preview = match row.preview {
        PreviewState::Pending => "...".to_string(),
        PreviewState::Ready { width, height } => format!("{width}x{height}"),
        PreviewState::Unreadable => "unreadable".to_string(),
    };
    format!(
        "[{mark}] {} ({}, {preview})",
        row.relative_path, row.extension
    )
}
