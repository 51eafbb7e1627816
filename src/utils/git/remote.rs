use std::fmt;

/// The one remote this tool manages.
pub const ORIGIN: &str = "origin";

/// A named remote and the URL it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
    pub name: String,
    pub url: String,
}

impl Remote {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    pub fn origin(url: impl Into<String>) -> Self {
        Self::new(ORIGIN, url)
    }

    /// Check that `url` is something git can fetch from.
    pub fn parse_url(url: &str) -> Result<gix::Url, gix::url::parse::Error> {
        gix::url::parse(url.into())
    }
}

impl fmt::Display for Remote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.name, self.url)
    }
}

/// What has to happen to make the stored remote match the wanted one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteChange {
    /// Stored remote already equals the wanted one
    Unchanged,
    /// No remote by that name yet
    Add,
    /// Stored remote points elsewhere; remove and re-add
    Replace { stale: Remote },
}

impl RemoteChange {
    /// Compare the stored remote (if any) against the wanted one.
    pub fn between(stored: Option<&Remote>, wanted: &Remote) -> Self {
        match stored {
            None => Self::Add,
            Some(stored) if stored == wanted => Self::Unchanged,
            Some(stored) => Self::Replace {
                stale: stored.clone(),
            },
        }
    }
}

/// Whether pull output says the requested branch does not exist remotely.
pub fn is_missing_remote_ref(output: &str) -> bool {
    let lower = output.to_ascii_lowercase();
    lower.contains("couldn't find remote ref") || lower.contains("no such ref was fetched")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_equality_uses_name_and_url() {
        let a = Remote::origin("git@example.com:me/site.git");
        assert_eq!(a, Remote::new("origin", "git@example.com:me/site.git"));
        assert_ne!(a, Remote::origin("https://example.com/me/site.git"));
        assert_ne!(a, Remote::new("upstream", "git@example.com:me/site.git"));
    }

    #[test]
    fn test_change_between() {
        let wanted = Remote::origin("https://example.com/new.git");
        assert_eq!(RemoteChange::between(None, &wanted), RemoteChange::Add);
        assert_eq!(
            RemoteChange::between(Some(&wanted.clone()), &wanted),
            RemoteChange::Unchanged
        );

        let stale = Remote::origin("https://example.com/old.git");
        assert_eq!(
            RemoteChange::between(Some(&stale), &wanted),
            RemoteChange::Replace { stale }
        );
    }

    #[test]
    fn test_parse_url() {
        assert!(Remote::parse_url("https://github.com/me/site.git").is_ok());
        assert!(Remote::parse_url("git@github.com:me/site.git").is_ok());
        assert!(Remote::parse_url("/srv/git/site.git").is_ok());
    }

    #[test]
    fn test_missing_remote_ref() {
        assert!(is_missing_remote_ref(
            "fatal: couldn't find remote ref main"
        ));
        assert!(is_missing_remote_ref(
            "Your configuration specifies to merge with the ref 'refs/heads/main'\nfrom the remote, but no such ref was fetched."
        ));
        assert!(!is_missing_remote_ref(
            "CONFLICT (content): Merge conflict in README.md\nerror: could not apply 1a2b3c4"
        ));
    }
}
