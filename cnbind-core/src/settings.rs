//! Runner settings. One value per invocation, passed by reference.

use cnbind_api::{ApiVersion, SupportedRange};
use cnbind_platform::BindingLayout;

#[derive(Debug, Clone)]
pub struct RunnerSettings {
    /// Buildpack API versions this runner accepts.
    pub range: SupportedRange,

    /// Used when the descriptor has no `api` key, or no descriptor exists.
    pub default_api: ApiVersion,

    pub binding_layout: BindingLayout,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        let range = SupportedRange::default();
        Self {
            default_api: range.max().clone(),
            range,
            binding_layout: BindingLayout::default(),
        }
    }
}
