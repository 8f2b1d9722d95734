//! Shell (surface set) loading: the surface table and its hitboxes.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::HostError;

/// An interactive region of a surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hitbox {
    pub id: String,
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

impl Hitbox {
    pub fn contains(&self, x: i64, y: i64) -> bool {
        self.x <= x && x <= self.x + self.w && self.y <= y && y <= self.y + self.h
    }
}

/// A named visual state of the character.
#[derive(Debug, Clone)]
pub struct Surface {
    pub id: String,
    pub file: Option<String>,
    pub hitboxes: Vec<Hitbox>,
}

#[derive(Debug, Clone)]
pub struct ShellDefinition {
    pub default_surface: String,
    pub surfaces: BTreeMap<String, Surface>,
    /// Balloon anchor offset from `meta.json`, if the shell declares one.
    pub bubble_offset: Option<(i64, i64)>,
}

#[derive(Deserialize)]
struct RawSurfaces {
    #[serde(default)]
    default: Option<String>,
    #[serde(default)]
    surfaces: BTreeMap<String, RawSurface>,
}

#[derive(Deserialize)]
struct RawSurface {
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    hitbox: Vec<RawHitbox>,
}

#[derive(Deserialize)]
struct RawHitbox {
    id: String,
    x: i64,
    y: i64,
    w: i64,
    h: i64,
}

/// Loads `<shell_dir>/<surfaces_file>` plus the optional `meta.json`
/// balloon offset.
pub fn load_shell(shell_dir: &Path, surfaces_file: &str) -> Result<ShellDefinition, HostError> {
    let text = fs::read_to_string(shell_dir.join(surfaces_file))?;
    let raw: RawSurfaces = serde_json::from_str(&text)?;
    let surfaces = raw
        .surfaces
        .into_iter()
        .map(|(id, surface)| {
            let hitboxes = surface
                .hitbox
                .into_iter()
                .map(|hb| Hitbox {
                    id: hb.id,
                    x: hb.x,
                    y: hb.y,
                    w: hb.w,
                    h: hb.h,
                })
                .collect();
            (
                id.clone(),
                Surface {
                    id,
                    file: surface.file,
                    hitboxes,
                },
            )
        })
        .collect();
    Ok(ShellDefinition {
        default_surface: raw.default.unwrap_or_else(|| "idle".to_string()),
        surfaces,
        bubble_offset: load_bubble_offset(shell_dir)?,
    })
}

/// `meta.json` may carry `descript."balloon.offset"` as an `"x,y"` string.
/// Anything malformed means no offset.
fn load_bubble_offset(shell_dir: &Path) -> Result<Option<(i64, i64)>, HostError> {
    let meta_path = shell_dir.join("meta.json");
    if !meta_path.is_file() {
        return Ok(None);
    }
    let meta: serde_json::Value = serde_json::from_str(&fs::read_to_string(&meta_path)?)?;
    let Some(raw) = meta
        .get("descript")
        .and_then(|descript| descript.get("balloon.offset"))
        .and_then(|offset| offset.as_str())
    else {
        return Ok(None);
    };
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    if parts.len() != 2 {
        return Ok(None);
    }
    match (parts[0].parse(), parts[1].parse()) {
        (Ok(x), Ok(y)) => Ok(Some((x, y))),
        _ => Ok(None),
    }
}
