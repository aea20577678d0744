//! # Defect Patcher
//!
//! Some GLM file revisions store the time offset variables as signed 16-bit
//! integers without the `_Unsigned` flag, which makes offsets past 32767 ticks
//! wrap around to negative values. The patcher adds the missing flag for the
//! duration of an extraction and removes it again afterwards unless the caller
//! asks to keep the fix.

use log::{debug, warn};

use crate::container::{AttrValue, Container, ContainerError, UNSIGNED_ATTRIBUTE};

/// Offset variables known to lack the `_Unsigned` attribute in older revisions
pub const DEFECTIVE_OFFSET_VARIABLES: [&str; 7] = [
    "event_time_offset",
    "group_time_offset",
    "flash_time_offset_of_first_event",
    "flash_time_offset_of_last_event",
    "group_frame_time_offset",
    "flash_frame_time_offset_of_first_event",
    "flash_frame_time_offset_of_last_event",
];

/// Value written to the `_Unsigned` attribute
pub const UNSIGNED_FIX_VALUE: &str = "true";

/// Variables that were patched by [`PatchSet::apply`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use = "a PatchSet should be reverted or explicitly kept"]
pub struct PatchSet {
    patched: Vec<String>,
}

impl PatchSet {
    /// Add the `_Unsigned` flag to every defective variable that lacks it.
    ///
    /// Variables that are absent, or already carry the attribute, are left alone.
    pub fn apply<C: Container + ?Sized>(container: &mut C) -> Result<Self, ContainerError> {
        let targets: Vec<String> = DEFECTIVE_OFFSET_VARIABLES
            .iter()
            .filter(|name| {
                container
                    .dataset()
                    .variable(name)
                    .map(|v| v.attribute(UNSIGNED_ATTRIBUTE).is_none())
                    .unwrap_or(false)
            })
            .map(|name| name.to_string())
            .collect();

        let mut patches = PatchSet::default();
        for name in targets {
            if let Err(e) = container.put_variable_attribute(
                &name,
                UNSIGNED_ATTRIBUTE,
                AttrValue::Text(UNSIGNED_FIX_VALUE.to_string()),
            ) {
                // Leave the container as we found it
                if let Err(revert_err) = patches.revert(container) {
                    warn!("Failed to undo partial patch: {}", revert_err);
                }
                return Err(e);
            }
            debug!("Patched missing {} on {}", UNSIGNED_ATTRIBUTE, name);
            patches.patched.push(name);
        }
        Ok(patches)
    }

    /// Names of the patched variables, in patch order
    pub fn patched(&self) -> &[String] {
        &self.patched
    }

    /// Whether nothing was patched
    pub fn is_empty(&self) -> bool {
        self.patched.is_empty()
    }

    /// Remove the attribute from every variable this set patched
    pub fn revert<C: Container + ?Sized>(self, container: &mut C) -> Result<(), ContainerError> {
        for name in &self.patched {
            container.delete_variable_attribute(name, UNSIGNED_ATTRIBUTE)?;
            debug!("Reverted {} on {}", UNSIGNED_ATTRIBUTE, name);
        }
        Ok(())
    }

    /// Keep the applied fixes in the container
    pub fn keep(self) -> Vec<String> {
        self.patched
    }
}

/// Run `f` with the defect patches applied.
///
/// Unless `keep` is set the patches are reverted on every exit path. When `f`
/// fails and the revert fails too, the revert error is logged and the error of
/// `f` is returned.
pub fn with_patches<C, T, E, F>(container: &mut C, keep: bool, f: F) -> Result<T, E>
where
    C: Container + ?Sized,
    E: From<ContainerError>,
    F: FnOnce(&mut C) -> Result<T, E>,
{
    let patches = PatchSet::apply(container)?;
    let result = f(container);

    if keep {
        let kept = patches.keep();
        if !kept.is_empty() {
            debug!("Keeping {} patched variable(s)", kept.len());
        }
        return result;
    }

    match (result, patches.revert(container)) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(revert_err)) => Err(revert_err.into()),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(revert_err)) => {
            warn!("Failed to revert defect patches after error: {}", revert_err);
            Err(e)
        }
    }
}
