//! Icon loading for the tray application

use anyhow::{Context, Result};
use image::GenericImageView;
use std::path::PathBuf;
use tracing::debug;
use tray_icon::Icon;

const ICON_ASSET: &str = "assets/icons/tray/helper.png";
const ICON_SIZE: u32 = 32;

/// Icon manager for the tray application
pub struct IconManager {
    icon: Icon,
}

impl IconManager {
    /// Load the tray icon, generating one when the asset is missing
    pub fn new() -> Result<Self> {
        let icon = match Self::load_icon_from_file(ICON_ASSET) {
            Ok(icon) => icon,
            Err(e) => {
                debug!("Using generated tray icon: {:#}", e);
                Self::generated_icon()?
            }
        };

        Ok(Self { icon })
    }

    /// Get asset path relative to executable
    ///
    /// Searches in order:
    /// 1. Executable directory (installed)
    /// 2. Current working directory (development)
    fn get_asset_path(relative_path: &str) -> Result<PathBuf> {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let path = exe_dir.join(relative_path);
                if path.exists() {
                    return Ok(path);
                }
            }
        }

        let cwd_path = std::env::current_dir()
            .context("Failed to get current directory")?
            .join(relative_path);

        if cwd_path.exists() {
            return Ok(cwd_path);
        }

        anyhow::bail!(
            "Asset not found: {} (searched in exe dir and current dir)",
            relative_path
        )
    }

    /// Load icon from PNG file
    fn load_icon_from_file(path: &str) -> Result<Icon> {
        let full_path = Self::get_asset_path(path)?;
        let img = image::open(&full_path)
            .with_context(|| format!("Failed to load icon: {:?}", full_path))?;
        let (width, height) = img.dimensions();
        let rgba = img.into_rgba8().into_raw();
        Ok(Icon::from_rgba(rgba, width, height)?)
    }

    /// Orange disc with a white play triangle
    fn generated_icon() -> Result<Icon> {
        let mut img = image::RgbaImage::new(ICON_SIZE, ICON_SIZE);
        let center = (ICON_SIZE as f32 - 1.0) / 2.0;
        let radius = ICON_SIZE as f32 / 2.0 - 1.0;

        for (x, y, pixel) in img.enumerate_pixels_mut() {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            if dx * dx + dy * dy > radius * radius {
                continue;
            }

            // Triangle pointing right, spanning a third of the icon either side.
            let fx = x as f32;
            let left = ICON_SIZE as f32 * 0.36;
            let right = ICON_SIZE as f32 * 0.74;
            let half_height = (right - fx) / (right - left) * (ICON_SIZE as f32 * 0.24);
            let inside = fx >= left && fx <= right && dy.abs() <= half_height;

            *pixel = if inside {
                image::Rgba([255, 255, 255, 255])
            } else {
                image::Rgba([255, 136, 0, 255])
            };
        }

        Ok(Icon::from_rgba(img.into_raw(), ICON_SIZE, ICON_SIZE)?)
    }

    /// Get the tray icon
    pub fn get_icon(&self) -> Icon {
        self.icon.clone()
    }
}
