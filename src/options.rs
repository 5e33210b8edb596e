//! Extraction options and the chapter theme.

/// Colors and typography of the HTML shell every chapter is wrapped in.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(default))]
pub struct Theme {
    pub background: String,
    pub foreground: String,
    pub link: String,
    /// Color of placeholder text.
    pub muted: String,
    pub font_family: String,
    pub line_height: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: "#1e1f22".to_string(),
            foreground: "#dcdcdc".to_string(),
            link: "#6cb4ee".to_string(),
            muted: "#8a8f98".to_string(),
            font_family: "Georgia, 'Times New Roman', serif".to_string(),
            line_height: "1.6".to_string(),
        }
    }
}

/// Options for one extraction pass.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(default))]
pub struct ExtractOptions {
    pub theme: Theme,
    /// Title for entries with neither their own nor a resource title.
    pub untitled_title: String,
    /// Spine fallback titles are `"{prefix} {n}"`, 1-based.
    pub spine_title_prefix: String,
    /// Placeholder paragraph text; `{title}` is replaced by the chapter title.
    pub placeholder_text: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            untitled_title: "Untitled".to_string(),
            spine_title_prefix: "Chapter".to_string(),
            placeholder_text: "No readable content for {title}.".to_string(),
        }
    }
}

impl ExtractOptions {
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Title of the `index`th (0-based) spine fallback chapter.
    pub fn spine_title(&self, index: usize) -> String {
        format!("{} {}", self.spine_title_prefix, index + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ExtractOptions::default();
        assert_eq!(options.untitled_title, "Untitled");
        assert_eq!(options.spine_title(0), "Chapter 1");
        assert_eq!(options.spine_title(9), "Chapter 10");
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_partial_json_keeps_defaults() {
        let options: ExtractOptions =
            serde_json::from_str(r##"{ "theme": { "background": "#fff" }, "spine_title_prefix": "Part" }"##)
                .unwrap();
        assert_eq!(options.theme.background, "#fff");
        assert_eq!(options.theme.link, Theme::default().link);
        assert_eq!(options.spine_title(1), "Part 2");
        assert_eq!(options.untitled_title, "Untitled");
    }
}
