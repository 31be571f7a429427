use clipper_core::{AppViewModel, ClientState};

const BAR_WIDTH: usize = 20;

/// Formats the view model as a single status line for the terminal.
pub fn render(view: &AppViewModel) -> String {
    match &view.phase {
        ClientState::Processing { progress, .. } => {
            format!("{} {}", progress_bar(*progress), view.headline)
        }
        ClientState::Idle | ClientState::Submitting => view.headline.clone(),
        ClientState::Completed { .. } => format!("[done] {}", view.headline),
        ClientState::Error { .. } => format!("[failed] {}", view.headline),
    }
}

fn progress_bar(progress: u8) -> String {
    let filled = usize::from(progress.min(100)) * BAR_WIDTH / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processing_line_has_bar_and_page_counts() {
        let view = AppViewModel {
            phase: ClientState::Processing {
                task_id: "t1".to_string(),
                progress: 50,
                total_pages: 4,
                processed_pages: 2,
            },
            headline: "Converting... 50% (2/4 pages)".to_string(),
            dirty: true,
        };

        assert_eq!(
            render(&view),
            "[##########----------] Converting... 50% (2/4 pages)"
        );
    }

    #[test]
    fn error_line_is_marked() {
        let view = AppViewModel {
            phase: ClientState::Error {
                message: "Crawl failed".to_string(),
            },
            headline: "Error: Crawl failed".to_string(),
            dirty: false,
        };

        assert_eq!(render(&view), "[failed] Error: Crawl failed");
    }
}
