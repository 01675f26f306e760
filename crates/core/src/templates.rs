//! Template registry.
//!
//! Static configuration for every slide layout: display metadata, which slide
//! fields the layout can render, and the theme it falls back to. Lookups are
//! total: an identifier without its own entry resolves to the `default` entry.

use crate::types::{Slide, SlideTemplate, SlideTheme};
use serde::Serialize;

/// Grouping shown in the template picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TemplateCategory {
    Basic,
    Image,
    Content,
    Special,
}

/// Which slide fields a template can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSupports {
    pub images: bool,
    pub subtitle: bool,
    pub theme: bool,
    pub background_image: bool,
}

/// Static description of a slide template.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateConfig {
    pub id: SlideTemplate,
    pub name: &'static str,
    pub category: TemplateCategory,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<&'static str>,
    pub supports: TemplateSupports,
    background: &'static str,
    text_color: &'static str,
}

impl TemplateConfig {
    /// The theme a slide gets when this template cannot carry its own.
    pub fn default_theme(&self) -> SlideTheme {
        SlideTheme::new(self.background, self.text_color)
    }

    /// Every way `slide` disagrees with what this template can render.
    pub fn incompatibilities(&self, slide: &Slide) -> Vec<Incompatibility> {
        let mut found = Vec::new();
        if !self.supports.images && (slide.image.is_some() || slide.image_url.is_some()) {
            found.push(Incompatibility::Image);
        }
        if !self.supports.subtitle && slide.subtitle.is_some() {
            found.push(Incompatibility::Subtitle);
        }
        if !self.supports.theme && slide.theme.as_ref() != Some(&self.default_theme()) {
            found.push(Incompatibility::Theme);
        }
        found
    }

    /// Whether `slide` can be rendered by this template without losing anything.
    ///
    /// The theme rule is stricter than a plain "carries a theme" check: when
    /// the template has no theme support, the slide must carry exactly the
    /// template's default theme, so a slide with no theme is also reported.
    /// A slide already holding the default theme passes. This is the state
    /// [`TemplateConfig::conform`] produces.
    pub fn is_compatible(&self, slide: &Slide) -> bool {
        self.incompatibilities(slide).is_empty()
    }

    /// Correct `slide` so this template can render it.
    ///
    /// Images are discarded and an unsupported theme is replaced by the
    /// template default. A subtitle is kept even when the template does not
    /// show it; that mismatch is only reported.
    pub fn conform(&self, slide: &mut Slide) {
        for incompatibility in self.incompatibilities(slide) {
            match incompatibility {
                Incompatibility::Image => {
                    log::debug!("Dropping image of slide {} for template {}", slide.id, self.id);
                    slide.image = None;
                    slide.image_url = None;
                }
                Incompatibility::Theme => {
                    slide.theme = Some(self.default_theme());
                }
                Incompatibility::Subtitle => {
                    log::warn!(
                        "Template {} does not show subtitles; keeping subtitle of slide {}",
                        self.id,
                        slide.id
                    );
                }
            }
        }
    }
}

/// A slide field the template cannot render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Incompatibility {
    Image,
    Subtitle,
    Theme,
}

/// On-screen layout used to render a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    Basic,
    Hero,
    TableOfContents,
    GridContent,
    ImageRight,
    ImageLeft,
    SplitImage,
}

/// Registered templates, in picker order.
static TEMPLATE_CONFIGS: [TemplateConfig; 7] = [
    TemplateConfig {
        id: SlideTemplate::Hero,
        name: "Hero Layout",
        category: TemplateCategory::Special,
        description: "Dramatic opening slide with curved image and gradient background",
        thumbnail: None,
        supports: TemplateSupports {
            images: true,
            subtitle: true,
            theme: true,
            background_image: false,
        },
        background: "bg-gradient-to-br from-gray-900 via-purple-900/40 to-teal-800/30",
        text_color: "text-white",
    },
    TemplateConfig {
        id: SlideTemplate::Default,
        name: "Basic Template",
        category: TemplateCategory::Basic,
        description: "Clean template with title and bullet points",
        thumbnail: None,
        supports: TemplateSupports {
            images: false,
            subtitle: true,
            theme: true,
            background_image: false,
        },
        background: "bg-gradient-to-r from-blue-900 to-blue-800",
        text_color: "text-white",
    },
    TemplateConfig {
        id: SlideTemplate::TableOfContents,
        name: "Table of Contents",
        category: TemplateCategory::Special,
        description: "Display a structured table of contents with numbers",
        thumbnail: None,
        supports: TemplateSupports {
            images: false,
            subtitle: false,
            theme: true,
            background_image: false,
        },
        background: "bg-gradient-to-br from-black via-purple-900 to-cyan-900",
        text_color: "text-white",
    },
    TemplateConfig {
        id: SlideTemplate::GridContent,
        name: "Grid Content",
        category: TemplateCategory::Content,
        description: "Display content in a 5-column grid layout with cards",
        thumbnail: None,
        supports: TemplateSupports {
            images: false,
            subtitle: true,
            theme: true,
            background_image: false,
        },
        background: "bg-gradient-to-br from-black via-purple-900 to-cyan-900",
        text_color: "text-white",
    },
    TemplateConfig {
        id: SlideTemplate::ImageLeft,
        name: "Image Left",
        category: TemplateCategory::Image,
        description: "Image on the left with content on the right",
        thumbnail: None,
        supports: TemplateSupports {
            images: true,
            subtitle: true,
            theme: true,
            background_image: false,
        },
        background: "bg-gradient-to-r from-gray-900 to-gray-800",
        text_color: "text-white",
    },
    TemplateConfig {
        id: SlideTemplate::ImageRight,
        name: "Image Right",
        category: TemplateCategory::Image,
        description: "Content on the left with image on the right",
        thumbnail: None,
        supports: TemplateSupports {
            images: true,
            subtitle: true,
            theme: true,
            background_image: false,
        },
        background: "bg-gradient-to-r from-gray-900 to-gray-800",
        text_color: "text-white",
    },
    TemplateConfig {
        id: SlideTemplate::SplitImage,
        name: "Split Layout",
        category: TemplateCategory::Special,
        description: "50/50 split with image and content",
        thumbnail: None,
        supports: TemplateSupports {
            images: true,
            subtitle: true,
            theme: true,
            background_image: true,
        },
        background: "bg-gray-900",
        text_color: "text-white",
    },
];

/// Index of the fallback entry in `TEMPLATE_CONFIGS`.
const DEFAULT_CONFIG: usize = 1;

/// All registered template configurations, in picker order.
pub fn template_configs() -> &'static [TemplateConfig] {
    &TEMPLATE_CONFIGS
}

/// Configuration for a template, falling back to the `default` entry.
pub fn template_config(template: SlideTemplate) -> &'static TemplateConfig {
    TEMPLATE_CONFIGS
        .iter()
        .find(|c| c.id == template)
        .unwrap_or(&TEMPLATE_CONFIGS[DEFAULT_CONFIG])
}

/// Configuration for a raw template identifier, falling back to the `default` entry.
pub fn template_config_by_id(id: &str) -> &'static TemplateConfig {
    match SlideTemplate::from_id(id) {
        Some(template) => template_config(template),
        None => &TEMPLATE_CONFIGS[DEFAULT_CONFIG],
    }
}

/// Layout that renders a template on the canvas.
pub fn renderer_for(template: SlideTemplate) -> Layout {
    match template {
        SlideTemplate::Default | SlideTemplate::Gallery => Layout::Basic,
        SlideTemplate::Hero => Layout::Hero,
        SlideTemplate::TableOfContents => Layout::TableOfContents,
        SlideTemplate::GridContent => Layout::GridContent,
        SlideTemplate::ImageRight | SlideTemplate::FullImage => Layout::ImageRight,
        SlideTemplate::ImageLeft => Layout::ImageLeft,
        SlideTemplate::SplitImage => Layout::SplitImage,
    }
}

/// Layout for a raw template identifier; unknown identifiers render with the basic layout.
pub fn renderer_for_id(id: &str) -> Layout {
    SlideTemplate::from_id(id)
        .map(renderer_for)
        .unwrap_or(Layout::Basic)
}

/// Registered templates grouped by category, categories in first-seen order.
pub fn templates_by_category() -> Vec<(TemplateCategory, Vec<&'static TemplateConfig>)> {
    let mut groups: Vec<(TemplateCategory, Vec<&'static TemplateConfig>)> = Vec::new();
    for config in TEMPLATE_CONFIGS.iter() {
        match groups.iter_mut().find(|(category, _)| *category == config.category) {
            Some((_, members)) => members.push(config),
            None => groups.push((config.category, vec![config])),
        }
    }
    groups
}
