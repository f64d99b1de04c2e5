/// Handle onto the repository under analysis. Opaque to the planner; items
/// receive it at initialisation and may use the remote list for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct RepoHandle {
    remotes: Vec<Remote>,
}

#[derive(Debug, Clone)]
pub struct Remote {
    pub name: String,
    pub urls: Vec<String>,
}

impl RepoHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_remotes(remotes: Vec<Remote>) -> Self {
        Self { remotes }
    }

    pub fn remotes(&self) -> &[Remote] {
        &self.remotes
    }

    /// First URL of the first remote, the conventional origin for log lines.
    pub fn origin_url(&self) -> Option<&str> {
        self.remotes
            .first()
            .and_then(|r| r.urls.first())
            .map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_url_picks_first() {
        let repo = RepoHandle::with_remotes(vec![
            Remote {
                name: "origin".to_string(),
                urls: vec!["https://example.com/a.git".to_string()],
            },
            Remote {
                name: "mirror".to_string(),
                urls: vec!["https://example.com/b.git".to_string()],
            },
        ]);
        assert_eq!(repo.origin_url(), Some("https://example.com/a.git"));
        assert_eq!(RepoHandle::new().origin_url(), None);
    }
}
