//! Client asset manifest

use std::collections::BTreeMap;

use serde::Deserialize;

use super::ResourceError;

/// Group holding the textures the client loads by index
pub const IMAGE_GROUP: &str = "imageFiles";

/// A set of client files sharing a content type
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetGroup {
    pub paths: Vec<String>,
    #[serde(default)]
    pub content_type: String,
}

/// Client files grouped by kind (images, scripts, pages)
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct AssetManifest {
    groups: BTreeMap<String, AssetGroup>,
}

impl AssetManifest {
    /// Texture paths in texture-id order
    pub fn textures(&self) -> Result<&[String], ResourceError> {
        self.groups
            .get(IMAGE_GROUP)
            .map(|g| g.paths.as_slice())
            .ok_or(ResourceError::MissingImages)
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &AssetGroup)> {
        self.groups.iter().map(|(name, group)| (name.as_str(), group))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "imageFiles": { "paths": ["/img/tank.png", "/img/box.png"], "contentType": "image/png" },
        "jsFiles": { "paths": ["/script.js"], "contentType": "text/javascript" }
    }"#;

    #[test]
    fn textures_come_from_image_group() {
        let manifest: AssetManifest = serde_json::from_str(MANIFEST).unwrap();
        assert_eq!(manifest.textures().unwrap(), ["/img/tank.png", "/img/box.png"]);
        assert_eq!(manifest.groups().count(), 2);
    }

    #[test]
    fn manifest_without_images_is_rejected() {
        let manifest: AssetManifest =
            serde_json::from_str(r#"{"jsFiles":{"paths":[]}}"#).unwrap();
        assert!(matches!(manifest.textures(), Err(ResourceError::MissingImages)));
    }
}
