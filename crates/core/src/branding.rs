// Style/branding parameters for the section-document renderer.
//
// Defaults live in one place (`BrandingParams::default`). Users and
// documents layer `BrandingOverrides` on top: defaults, then user, then
// document.

use serde::{Deserialize, Serialize};

/// Where logos are placed relative to the proposal title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogoPosition {
    #[default]
    TopCenter,
    TopLeft,
    TopRight,
    NextToTitle,
}

impl LogoPosition {
    /// CSS `text-align` for the standalone logo block, taken from the suffix.
    pub fn alignment(self) -> &'static str {
        match self {
            LogoPosition::TopCenter | LogoPosition::NextToTitle => "center",
            LogoPosition::TopLeft => "left",
            LogoPosition::TopRight => "right",
        }
    }

    /// Flex `justify-content` matching [`Self::alignment`].
    pub fn justify(self) -> &'static str {
        match self {
            LogoPosition::TopCenter | LogoPosition::NextToTitle => "center",
            LogoPosition::TopLeft => "flex-start",
            LogoPosition::TopRight => "flex-end",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogoSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl LogoSize {
    /// Max height in px for logos in the block above the title.
    pub fn standalone_height_px(self) -> u32 {
        match self {
            LogoSize::Small => 60,
            LogoSize::Medium => 100,
            LogoSize::Large => 150,
        }
    }

    /// Max height in px for logos flanking the title.
    pub fn beside_title_height_px(self) -> u32 {
        match self {
            LogoSize::Small => 40,
            LogoSize::Medium => 60,
            LogoSize::Large => 80,
        }
    }
}

/// Max logo width in px, independent of [`LogoSize`].
pub const LOGO_MAX_WIDTH_PX: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogoLayout {
    #[default]
    SideBySide,
    Stacked,
    OppositeSides,
}

/// Page margins in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageMargins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for PageMargins {
    fn default() -> Self {
        Self { top: 20.0, right: 20.0, bottom: 20.0, left: 20.0 }
    }
}

impl PageMargins {
    /// CSS shorthand in `top right bottom left` order.
    pub fn css(&self) -> String {
        format!("{}mm {}mm {}mm {}mm", self.top, self.right, self.bottom, self.left)
    }
}

/// Fully resolved branding applied to every export of a section document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandingParams {
    pub primary_color: String,
    pub secondary_color: String,
    pub text_color: String,
    pub heading_color: String,
    pub font_family: String,
    /// Base font size in px.
    pub font_size_base: u32,
    pub line_height: f32,
    pub margins: PageMargins,
    pub logo_position: LogoPosition,
    pub logo_size: LogoSize,
    pub logo_layout: LogoLayout,
    /// Image reference for the sender's logo, usually a data URI.
    pub company_logo: Option<String>,
    pub client_logo: Option<String>,
    /// Shown in the footer when set.
    pub company_name: Option<String>,
    pub show_header: bool,
    pub show_footer: bool,
    pub show_page_numbers: bool,
}

impl Default for BrandingParams {
    fn default() -> Self {
        Self {
            primary_color: "#2563eb".into(),
            secondary_color: "#64748b".into(),
            text_color: "#1f2937".into(),
            heading_color: "#111827".into(),
            font_family: "'Inter', -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif".into(),
            font_size_base: 14,
            line_height: 1.6,
            margins: PageMargins::default(),
            logo_position: LogoPosition::default(),
            logo_size: LogoSize::default(),
            logo_layout: LogoLayout::default(),
            company_logo: None,
            client_logo: None,
            company_name: None,
            show_header: true,
            show_footer: true,
            show_page_numbers: true,
        }
    }
}

/// Partial branding: every field optional, `None` keeps the lower layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrandingOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size_base: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margins: Option<PageMargins>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_position: Option<LogoPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_size: Option<LogoSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_layout: Option<LogoLayout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_header: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_footer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_page_numbers: Option<bool>,
}

impl BrandingOverrides {
    /// `self` with every field that `top` sets replaced by `top`'s value.
    pub fn layered(mut self, top: &BrandingOverrides) -> Self {
        fn keep<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                *target = value.clone();
            }
        }

        keep(&mut self.primary_color, &top.primary_color);
        keep(&mut self.secondary_color, &top.secondary_color);
        keep(&mut self.text_color, &top.text_color);
        keep(&mut self.heading_color, &top.heading_color);
        keep(&mut self.font_family, &top.font_family);
        keep(&mut self.font_size_base, &top.font_size_base);
        keep(&mut self.line_height, &top.line_height);
        keep(&mut self.margins, &top.margins);
        keep(&mut self.logo_position, &top.logo_position);
        keep(&mut self.logo_size, &top.logo_size);
        keep(&mut self.logo_layout, &top.logo_layout);
        keep(&mut self.company_logo, &top.company_logo);
        keep(&mut self.client_logo, &top.client_logo);
        keep(&mut self.company_name, &top.company_name);
        keep(&mut self.show_header, &top.show_header);
        keep(&mut self.show_footer, &top.show_footer);
        keep(&mut self.show_page_numbers, &top.show_page_numbers);
        self
    }
}

impl BrandingParams {
    /// Defaults, then the user's saved preferences, then per-document overrides.
    pub fn resolve(user: &BrandingOverrides, document: &BrandingOverrides) -> Self {
        Self::default().with_overrides(user).with_overrides(document)
    }

    pub fn with_overrides(mut self, overrides: &BrandingOverrides) -> Self {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(value) = value {
                *target = value.clone();
            }
        }
        fn set_some<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                *target = value.clone();
            }
        }

        set(&mut self.primary_color, &overrides.primary_color);
        set(&mut self.secondary_color, &overrides.secondary_color);
        set(&mut self.text_color, &overrides.text_color);
        set(&mut self.heading_color, &overrides.heading_color);
        set(&mut self.font_family, &overrides.font_family);
        set(&mut self.font_size_base, &overrides.font_size_base);
        set(&mut self.line_height, &overrides.line_height);
        set(&mut self.margins, &overrides.margins);
        set(&mut self.logo_position, &overrides.logo_position);
        set(&mut self.logo_size, &overrides.logo_size);
        set(&mut self.logo_layout, &overrides.logo_layout);
        set_some(&mut self.company_logo, &overrides.company_logo);
        set_some(&mut self.client_logo, &overrides.client_logo);
        set_some(&mut self.company_name, &overrides.company_name);
        set(&mut self.show_header, &overrides.show_header);
        set(&mut self.show_footer, &overrides.show_footer);
        set(&mut self.show_page_numbers, &overrides.show_page_numbers);
        self
    }

    /// Logo references that are actually set (non-blank).
    pub fn logos(&self) -> (Option<&str>, Option<&str>) {
        fn present(logo: &Option<String>) -> Option<&str> {
            logo.as_deref().map(str::trim).filter(|value| !value.is_empty())
        }
        (present(&self.company_logo), present(&self.client_logo))
    }
}
