use crate::upload::UploadedAsset;
use eframe::egui;

/// Longest edge of the decoded preview; the full-size bytes are what gets
/// submitted.
const PREVIEW_MAX_EDGE: u32 = 1024;

struct PreviewTexture {
    asset_id: u64,
    texture: Option<egui::TextureHandle>,
}

/// View-only state. Everything about the job itself lives in the controller.
#[derive(Default)]
pub struct ViewState {
    preview: Option<PreviewTexture>,
    pub drop_hover: bool,
}

impl ViewState {
    pub fn clear(&mut self) {
        *self = ViewState::default();
    }

    /// Texture for the asset's preview, decoded once per selection. `None`
    /// when there is no asset or its bytes are not a decodable image.
    pub fn preview_texture(
        &mut self,
        ctx: &egui::Context,
        asset: Option<&UploadedAsset>,
    ) -> Option<egui::load::SizedTexture> {
        let Some(asset) = asset else {
            self.preview = None;
            return None;
        };

        let stale = self
            .preview
            .as_ref()
            .map_or(true, |preview| preview.asset_id != asset.id());
        if stale {
            let texture = match decode_preview(asset.bytes()) {
                Ok(image) => Some(ctx.load_texture(
                    format!("preview-{}", asset.id()),
                    image,
                    egui::TextureOptions::LINEAR,
                )),
                Err(e) => {
                    tracing::warn!(file = %asset.file_name(), error = %e, "Could not decode preview");
                    None
                }
            };
            self.preview = Some(PreviewTexture {
                asset_id: asset.id(),
                texture,
            });
        }

        self.preview
            .as_ref()
            .and_then(|preview| preview.texture.as_ref())
            .map(egui::load::SizedTexture::from_handle)
    }
}

/// Decode image bytes into RGBA pixels, downscaled to fit the preview.
pub fn decode_preview(bytes: &[u8]) -> Result<egui::ColorImage, image::ImageError> {
    let decoded = image::load_from_memory(bytes)?;
    let rgba = if decoded.width() > PREVIEW_MAX_EDGE || decoded.height() > PREVIEW_MAX_EDGE {
        decoded.thumbnail(PREVIEW_MAX_EDGE, PREVIEW_MAX_EDGE).to_rgba8()
    } else {
        decoded.to_rgba8()
    };
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}
