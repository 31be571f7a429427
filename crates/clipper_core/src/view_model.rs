use crate::ClientState;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub phase: ClientState,
    /// One-line human readable summary of the phase.
    pub headline: String,
    pub dirty: bool,
}

impl AppViewModel {
    pub(crate) fn from_phase(phase: &ClientState, dirty: bool) -> Self {
        Self {
            phase: phase.clone(),
            headline: headline(phase),
            dirty,
        }
    }
}

fn headline(phase: &ClientState) -> String {
    match phase {
        ClientState::Idle => "Ready".to_string(),
        ClientState::Submitting => "Submitting...".to_string(),
        ClientState::Processing {
            progress,
            total_pages,
            processed_pages,
            ..
        } => {
            if *total_pages > 0 {
                format!("Converting... {progress}% ({processed_pages}/{total_pages} pages)")
            } else {
                format!("Converting... {progress}%")
            }
        }
        ClientState::Completed {
            markdown,
            saved_path,
            upload_link,
            ..
        } => {
            let mut line = format!("Done ({} chars)", markdown.chars().count());
            if let Some(path) = saved_path {
                line.push_str(&format!(", saved to {path}"));
            }
            if let Some(link) = upload_link {
                line.push_str(&format!(", uploaded: {link}"));
            }
            line
        }
        ClientState::Error { message } => format!("Error: {message}"),
    }
}
