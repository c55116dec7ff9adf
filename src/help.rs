/// Builder for documentation URLs embedded in validation messages.
#[derive(Debug, Clone)]
pub struct HelpIndex {
    root: String,
}

pub const DEFAULT_HELP_ROOT: &str = "https://cartosync.dev";

impl Default for HelpIndex {
    fn default() -> Self {
        Self::new(DEFAULT_HELP_ROOT)
    }
}

impl HelpIndex {
    pub fn new(root: impl Into<String>) -> Self {
        let mut root = root.into();
        while root.ends_with('/') {
            root.pop();
        }
        HelpIndex { root }
    }

    pub fn howto_attachment_widget(&self) -> String {
        format!("{}/docs/layer/setting-up-forms/", self.root)
    }

    pub fn howto_background_maps(&self) -> String {
        format!("{}/docs/gis/setting-up-background-maps/", self.root)
    }

    pub fn subscription_link(&self) -> String {
        format!("{}/pricing/", self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_stripped() {
        let help = HelpIndex::new("https://example.org/");
        assert_eq!(
            help.howto_background_maps(),
            "https://example.org/docs/gis/setting-up-background-maps/"
        );
    }
}
