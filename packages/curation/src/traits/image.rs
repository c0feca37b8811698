//! Image collaborator traits: sample bytes in, rendered previews out.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::RecipeSettings;

/// Provides the fixed sample image previews are rendered from.
#[async_trait]
pub trait SampleImageProvider: Send + Sync {
    /// Fetch raw image bytes by name.
    async fn fetch(&self, name: &str) -> Result<Vec<u8>>;
}

/// Sample provider reading from a directory of image files.
pub struct DirectorySampleProvider {
    root: std::path::PathBuf,
}

impl DirectorySampleProvider {
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl SampleImageProvider for DirectorySampleProvider {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>> {
        // Names are plain file names, never paths.
        if name.contains('/') || name.contains("..") || name.contains('\\') {
            return Err(crate::error::CurationError::SampleImageNotFound {
                name: name.to_string(),
            });
        }

        tokio::fs::read(self.root.join(name)).await.map_err(|_| {
            crate::error::CurationError::SampleImageNotFound {
                name: name.to_string(),
            }
        })
    }
}

/// The pair of previews produced by the processing stage.
///
/// Either side may be absent: rendering failures degrade the response,
/// they never abort it. Images are data URLs ready to attach to a
/// recipe.
#[derive(Debug, Clone, Default)]
pub struct PreviewSet {
    /// Resized but otherwise unmodified sample.
    pub source: Option<String>,

    /// Sample with the full settings chain applied.
    pub retouched: Option<String>,
}

/// Renders the before/after previews for a recipe.
///
/// Infallible by contract: implementations catch their own failures,
/// log them, and return whatever subset of previews they managed to
/// produce.
#[async_trait]
pub trait PreviewRenderer: Send + Sync {
    async fn render(&self, settings: Option<&RecipeSettings>, monochrome: bool) -> PreviewSet;
}
