// Video provider detection shared by the validator and the serializer.

use std::sync::OnceLock;

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoProvider {
    YouTube,
    Vimeo,
    Loom,
}

impl VideoProvider {
    /// Matching precedence when a URL could match more than one pattern.
    pub const PRECEDENCE: [VideoProvider; 3] =
        [VideoProvider::YouTube, VideoProvider::Vimeo, VideoProvider::Loom];

    fn pattern(self) -> &'static Regex {
        static YOUTUBE: OnceLock<Regex> = OnceLock::new();
        static VIMEO: OnceLock<Regex> = OnceLock::new();
        static LOOM: OnceLock<Regex> = OnceLock::new();
        match self {
            VideoProvider::YouTube => YOUTUBE.get_or_init(|| {
                Regex::new(r"(?:youtube\.com/watch\?(?:[^#\s]*&)?v=|youtu\.be/)([A-Za-z0-9_-]+)")
                    .expect("youtube pattern should compile")
            }),
            VideoProvider::Vimeo => VIMEO.get_or_init(|| {
                Regex::new(r"vimeo\.com/(?:video/)?(\d+)").expect("vimeo pattern should compile")
            }),
            VideoProvider::Loom => LOOM.get_or_init(|| {
                Regex::new(r"loom\.com/share/([A-Za-z0-9]+)").expect("loom pattern should compile")
            }),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            VideoProvider::YouTube => "YouTube",
            VideoProvider::Vimeo => "Vimeo",
            VideoProvider::Loom => "Loom",
        }
    }
}

/// A recognized provider link reduced to its embeddable id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoEmbed {
    pub provider: VideoProvider,
    pub id: String,
}

impl VideoEmbed {
    /// Detect the provider of `url`, trying YouTube, then Vimeo, then Loom.
    pub fn detect(url: &str) -> Option<Self> {
        VideoProvider::PRECEDENCE.into_iter().find_map(|provider| {
            provider
                .pattern()
                .captures(url)
                .and_then(|captures| captures.get(1))
                .map(|id| VideoEmbed { provider, id: id.as_str().to_string() })
        })
    }

    pub fn embed_url(&self) -> String {
        match self.provider {
            VideoProvider::YouTube => format!("https://www.youtube.com/embed/{}", self.id),
            VideoProvider::Vimeo => format!("https://player.vimeo.com/video/{}", self.id),
            VideoProvider::Loom => format!("https://www.loom.com/embed/{}", self.id),
        }
    }
}
