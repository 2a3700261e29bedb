//! Loading of asset files. Native builds read from `./assets/`, wasm builds
//! fetch `<origin>/assets/` over HTTP.

use crate::texture::Texture;

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    use anyhow::Context;

    let window = web_sys::window().context("No browser window")?;
    let origin = window
        .location()
        .origin()
        .map_err(|e| anyhow::anyhow!("No page origin: {:?}", e))?;
    let base = reqwest::Url::parse(&format!("{}/assets/", origin))?;
    Ok(base.join(file_name)?)
}

pub async fn load_string(file_name: &str) -> anyhow::Result<String> {
    #[cfg(target_arch = "wasm32")]
    let txt = {
        let url = format_url(file_name)?;
        reqwest::get(url).await?.text().await?
    };
    #[cfg(not(target_arch = "wasm32"))]
    let txt = {
        let path = std::path::Path::new("./").join("assets").join(file_name);
        std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Could not read {}: {}", path.display(), e))?
    };

    Ok(txt)
}

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name)?;
        reqwest::get(url).await?.bytes().await?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = std::path::Path::new("./").join("assets").join(file_name);
        std::fs::read(&path)
            .map_err(|e| anyhow::anyhow!("Could not read {}: {}", path.display(), e))?
    };

    Ok(data)
}

pub async fn load_texture(
    file_name: &str,
    linear: bool,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Texture> {
    let data = load_binary(file_name).await?;
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str());
    Texture::from_bytes(device, queue, &data, file_name, extension, linear)
}
