/// Lazy iterator over the ancestors of a root-relative directory path
///
/// For `a/b/c` yields `a/b/c` → `a/b` → `a` → `.`. The root itself (`.`)
/// yields only `.`. Slices borrow from the input; nothing is allocated.
///
/// Route filtering uses it to decide which middleware directories are
/// active for the surviving route directories.
///
/// # Examples
///
/// ```
/// use trellis_router::path::PathHierarchy;
///
/// let dirs: Vec<&str> = PathHierarchy::new("api/users").collect();
/// assert_eq!(dirs, vec!["api/users", "api", "."]);
/// ```
#[derive(Clone)]
pub struct PathHierarchy<'a> {
    current: Option<&'a str>,
}

impl<'a> PathHierarchy<'a> {
    pub fn new(relative: &'a str) -> Self {
        Self {
            current: Some(relative),
        }
    }
}

impl<'a> Iterator for PathHierarchy<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;

        self.current = if current == "." || current.is_empty() {
            None
        } else if let Some(slash_pos) = current.rfind('/') {
            Some(&current[..slash_pos])
        } else {
            Some(".")
        };

        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_up_to_root() {
        let dirs: Vec<&str> = PathHierarchy::new("a/b/c/d").collect();
        assert_eq!(dirs, vec!["a/b/c/d", "a/b/c", "a/b", "a", "."]);
    }

    #[test]
    fn root_yields_itself() {
        let dirs: Vec<&str> = PathHierarchy::new(".").collect();
        assert_eq!(dirs, vec!["."]);
    }

    #[test]
    fn short_circuits() {
        let mut iter = PathHierarchy::new("a/b/c");
        assert_eq!(iter.find(|&p| p == "a/b"), Some("a/b"));
        assert_eq!(iter.next(), Some("a"));
    }
}
