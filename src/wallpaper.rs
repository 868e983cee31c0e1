//! # Wallpaper Applier
//!
//! Plasma has no single "set wallpaper" call. Instead we send a script to
//! `org.kde.PlasmaShell.evaluateScript` that switches every desktop to the
//! image plugin and writes the new image path into its config.
//!
//! Fill mode 3 is Qt's `Image.Tile`.

use tracing::info;

use crate::artwork::ArtworkRef;
use crate::bus::DesktopBus;
use crate::error::ApplyError;
use crate::state::WallpaperState;

/// Builds the Plasma script that sets `image` on every desktop.
pub fn wallpaper_script(image: &ArtworkRef) -> String {
    format!(
        r#"var allDesktops = desktops();
	for (i=0;i<allDesktops.length;i++) {{
		d = allDesktops[i];
		d.wallpaperPlugin = "org.kde.image";
		d.currentConfigGroup = Array("Wallpaper", "org.kde.image", "General");
		d.writeConfig("Image", "{}");
		d.writeConfig("FillMode", 3);
	}}"#,
        escape_js(image.as_str())
    )
}

/// Escapes a value for a double-quoted JS string literal
fn escape_js(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Sets `image` as the wallpaper and records it in `state.previous`.
///
/// `state.previous` only changes when plasmashell accepts the script, so a
/// failed apply is retried on the next tick.
pub async fn apply<B: DesktopBus>(
    bus: &B,
    state: &mut WallpaperState,
    image: &ArtworkRef,
) -> Result<(), ApplyError> {
    info!(image = %image, "changing wallpaper");
    bus.evaluate_script(&wallpaper_script(image)).await?;
    state.previous = image.clone();
    Ok(())
}
