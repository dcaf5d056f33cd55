use serde::{Deserialize, Serialize};

/// Configuration for the tasks module (`modules.tasks`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TasksConfig {
    /// Prefix for navigation links and `Location`; empty keeps them path-relative.
    #[serde(default)]
    pub public_url: String,
    #[serde(default = "default_per_page")]
    pub default_per_page: u64,
    #[serde(default = "default_max_per_page")]
    pub max_per_page: u64,
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            public_url: String::new(),
            default_per_page: default_per_page(),
            max_per_page: default_max_per_page(),
        }
    }
}

impl TasksConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_per_page == 0 {
            anyhow::bail!("tasks.max_per_page must be at least 1");
        }
        if !(1..=self.max_per_page).contains(&self.default_per_page) {
            anyhow::bail!(
                "tasks.default_per_page must be between 1 and max_per_page ({})",
                self.max_per_page
            );
        }
        Ok(())
    }
}

fn default_per_page() -> u64 {
    10
}

fn default_max_per_page() -> u64 {
    100
}
