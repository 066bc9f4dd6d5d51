//! Per-frame pass sequencing.
//!
//! The frame path is decided once per frame from the viewer settings and
//! fully determines which render passes run and in what order. Keeping it
//! as plain data makes the sequencing testable without a GPU.

use aoview_core::AoSettings;

/// One render pass within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Draws the scene with Phong shading. Direct frames write to the
    /// swapchain; deferred frames write color and view-space normals to
    /// offscreen targets.
    Geometry,
    /// Estimates per-pixel occlusion from depth, normals, and noise.
    AoEstimate,
    /// Blurs the occlusion buffer and multiplies it into the color buffer,
    /// writing the swapchain.
    BlurComposite,
}

/// How a frame reaches the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FramePath {
    /// Single forward pass, no occlusion.
    #[default]
    Direct,
    /// Geometry to offscreen targets, then occlusion and composite.
    DeferredAo,
}

impl FramePath {
    #[must_use]
    pub fn from_settings(ao: AoSettings) -> Self {
        if ao.enabled {
            FramePath::DeferredAo
        } else {
            FramePath::Direct
        }
    }

    /// The passes this path runs, in execution order.
    #[must_use]
    pub fn passes(self) -> &'static [PassKind] {
        match self {
            FramePath::Direct => &[PassKind::Geometry],
            FramePath::DeferredAo => &[
                PassKind::Geometry,
                PassKind::AoEstimate,
                PassKind::BlurComposite,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_select_direct_path() {
        let path = FramePath::from_settings(AoSettings::default());
        assert_eq!(path, FramePath::Direct);
        assert_eq!(path.passes(), &[PassKind::Geometry]);
    }

    #[test]
    fn toggling_twice_restores_the_pass_sequence() {
        let mut ao = AoSettings::default();
        let before = FramePath::from_settings(ao).passes();

        ao.toggle();
        assert_eq!(FramePath::from_settings(ao), FramePath::DeferredAo);
        ao.toggle();

        assert_eq!(FramePath::from_settings(ao).passes(), before);
    }

    #[test]
    fn direct_path_never_estimates_occlusion() {
        assert!(!FramePath::Direct.passes().contains(&PassKind::AoEstimate));
    }

    #[test]
    fn deferred_path_runs_all_three_passes_in_order() {
        assert_eq!(
            FramePath::DeferredAo.passes(),
            &[
                PassKind::Geometry,
                PassKind::AoEstimate,
                PassKind::BlurComposite
            ]
        );
    }
}
