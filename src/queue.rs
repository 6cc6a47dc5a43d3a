// Duplicate-task detection, keyed by source URL
//
// The real registry is owned by the task-queue system driving this
// crate; `TaskRegistry` is the seam it plugs into. The in-memory
// implementation covers embedding and tests.

use std::collections::HashMap;
use std::sync::RwLock;

/// Lookup seam over the task queue's in-flight registry
pub trait TaskRegistry: Send + Sync {
    /// Task id of an in-flight download for this URL, if any
    fn existing_task_id(&self, url: &str) -> Option<String>;
}

#[derive(Default)]
pub struct InMemoryTaskRegistry {
    tasks: RwLock<HashMap<String, String>>,
}

impl InMemoryTaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a URL for a task id. Returns the previous owner when the
    /// URL was already claimed.
    pub fn claim(&self, url: &str, task_id: &str) -> Option<String> {
        let mut tasks = self.tasks.write().unwrap();
        if let Some(existing) = tasks.get(url) {
            return Some(existing.clone());
        }
        tasks.insert(url.to_string(), task_id.to_string());
        None
    }

    /// Release a URL once its task has finished
    pub fn release(&self, url: &str) {
        self.tasks.write().unwrap().remove(url);
    }
}

impl TaskRegistry for InMemoryTaskRegistry {
    fn existing_task_id(&self, url: &str) -> Option<String> {
        self.tasks.read().unwrap().get(url).cloned()
    }
}

/// Registry that never reports duplicates
pub struct NoopTaskRegistry;

impl TaskRegistry for NoopTaskRegistry {
    fn existing_task_id(&self, _url: &str) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_and_release() {
        let registry = InMemoryTaskRegistry::new();
        let url = "https://deezer.com/playlist/1";

        assert_eq!(registry.existing_task_id(url), None);
        assert_eq!(registry.claim(url, "task-1"), None);
        assert_eq!(registry.existing_task_id(url), Some("task-1".to_string()));

        // Second claim reports the existing owner, does not overwrite
        assert_eq!(registry.claim(url, "task-2"), Some("task-1".to_string()));
        assert_eq!(registry.existing_task_id(url), Some("task-1".to_string()));

        registry.release(url);
        assert_eq!(registry.existing_task_id(url), None);
    }
}
