use std::collections::{BTreeMap, BTreeSet, btree_map::Entry};

use crate::cache::bypass::{BypassPolicy, NeverBypass};
use crate::cache::texture::{TextureAllocator, TextureDesc, TextureHint, TextureId};
use crate::foundation::core::{ColorSpace, PixelSize, RenderPassId, TextureFormat};
use crate::foundation::error::{CompositorError, CompositorResult};
use crate::model::pass::RenderPass;
use crate::model::quad::DrawQuad;

/// Cache entry for one non-root pass.
///
/// `texture` is `None` until first use, and again after the previous texture was freed for being
/// too small or allocated with the wrong usage bits.
#[derive(Clone, Debug, PartialEq)]
pub struct CachedPassTexture {
    required: TextureDesc,
    texture: Option<(TextureId, TextureDesc)>,
}

impl CachedPassTexture {
    /// What the owning pass needs this frame.
    pub fn required(&self) -> &TextureDesc {
        &self.required
    }

    /// The allocated texture, if any.
    pub fn texture(&self) -> Option<TextureId> {
        self.texture.map(|(id, _)| id)
    }

    /// Size the current texture was allocated with.
    pub fn allocated_size(&self) -> Option<PixelSize> {
        self.texture.map(|(_, desc)| desc.size)
    }
}

/// Counters from one [`RenderPassTextureCache::reconcile_for_frame`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Entries created for passes seen for the first time.
    pub added: usize,
    /// Textures freed because they no longer fit their pass.
    pub freed: usize,
    /// Entries removed because their pass left the frame.
    pub evicted: usize,
    /// Passes that will be drawn through their bypass quad.
    pub bypassed: usize,
}

/// Offscreen textures for non-root render passes, persisted across frames.
#[derive(Debug)]
pub struct RenderPassTextureCache {
    entries: BTreeMap<RenderPassId, CachedPassTexture>,
    bypass_policy: Box<dyn BypassPolicy>,
    bypass_quads: BTreeMap<RenderPassId, DrawQuad>,
    enlarge: PixelSize,
    format: TextureFormat,
}

impl Default for RenderPassTextureCache {
    fn default() -> Self {
        Self::new(Box::new(NeverBypass))
    }
}

impl RenderPassTextureCache {
    /// Empty cache consulting `bypass_policy` every frame.
    pub fn new(bypass_policy: Box<dyn BypassPolicy>) -> Self {
        Self {
            entries: BTreeMap::new(),
            bypass_policy,
            bypass_quads: BTreeMap::new(),
            enlarge: PixelSize::default(),
            format: TextureFormat::default(),
        }
    }

    /// Extra pixels added to every pass texture in each dimension.
    pub fn with_enlargement(mut self, amount: PixelSize) -> Self {
        self.enlarge = amount;
        self
    }

    /// Storage format of pass textures.
    pub fn with_format(mut self, format: TextureFormat) -> Self {
        self.format = format;
        self
    }

    /// Replace the bypass strategy.
    pub fn set_bypass_policy(&mut self, policy: Box<dyn BypassPolicy>) {
        self.bypass_policy = policy;
    }

    /// Bring entries in line with `passes`, whose last element is the root.
    ///
    /// Entries for vanished passes are evicted and their textures freed. Textures that no longer
    /// satisfy their pass are freed but the entry stays, so the next bind reallocates. Nothing is
    /// allocated here.
    #[tracing::instrument(level = "debug", skip_all, fields(passes = passes.len()))]
    pub fn reconcile_for_frame(
        &mut self,
        passes: &[RenderPass],
        color_space: ColorSpace,
        allocator: &mut dyn TextureAllocator,
    ) -> ReconcileStats {
        let mut stats = ReconcileStats::default();
        self.bypass_quads.clear();

        let mut required = BTreeMap::new();
        if let Some((_root, children)) = passes.split_last() {
            for pass in children {
                if let Some(quad) = self.bypass_policy.bypass_quad(pass) {
                    tracing::debug!(pass = pass.id.0, "render pass bypassed");
                    self.bypass_quads.insert(pass.id, quad.clone());
                    continue;
                }
                required.insert(pass.id, self.required_desc(pass, color_space));
            }
        }
        stats.bypassed = self.bypass_quads.len();

        self.entries.retain(|id, entry| {
            if required.contains_key(id) {
                return true;
            }
            if let Some((texture, _)) = entry.texture.take() {
                allocator.free_texture(texture);
            }
            stats.evicted += 1;
            false
        });

        for (id, desc) in required {
            match self.entries.entry(id) {
                Entry::Vacant(slot) => {
                    slot.insert(CachedPassTexture {
                        required: desc,
                        texture: None,
                    });
                    stats.added += 1;
                }
                Entry::Occupied(slot) => {
                    let entry = slot.into_mut();
                    entry.required = desc;
                    if let Some((texture, allocated)) = entry.texture
                        && !allocated.satisfies(&desc)
                    {
                        allocator.free_texture(texture);
                        entry.texture = None;
                        stats.freed += 1;
                    }
                }
            }
        }

        tracing::debug!(
            added = stats.added,
            freed = stats.freed,
            evicted = stats.evicted,
            bypassed = stats.bypassed,
            "pass textures reconciled"
        );
        stats
    }

    fn required_desc(&self, pass: &RenderPass, color_space: ColorSpace) -> TextureDesc {
        TextureDesc {
            size: PixelSize::covering(pass.output_rect.size()).enlarged(self.enlarge),
            hint: TextureHint::FRAMEBUFFER.with_mipmap(pass.generate_mipmap),
            format: self.format,
            color_space,
        }
    }

    /// Texture currently backing `id`; `None` without an entry or before first use.
    pub fn get(&self, id: RenderPassId) -> Option<TextureId> {
        self.entries.get(&id).and_then(CachedPassTexture::texture)
    }

    /// Cache entry for `id`.
    pub fn entry(&self, id: RenderPassId) -> Option<&CachedPassTexture> {
        self.entries.get(&id)
    }

    /// Texture for `id`, allocating it on first use.
    pub fn ensure_allocated(
        &mut self,
        id: RenderPassId,
        allocator: &mut dyn TextureAllocator,
    ) -> CompositorResult<TextureId> {
        let entry = self.entries.get_mut(&id).ok_or_else(|| {
            CompositorError::resource(format!("render pass {} has no cache entry", id.0))
        })?;
        if let Some((texture, _)) = entry.texture {
            return Ok(texture);
        }
        let texture = allocator.allocate_texture(&entry.required)?;
        entry.texture = Some((texture, entry.required));
        Ok(texture)
    }

    /// `true` when `id` has an allocated texture.
    pub fn has_resource(&self, id: RenderPassId) -> bool {
        self.get(id).is_some()
    }

    /// `true` when `id` was bypassed by the last reconcile.
    pub fn is_bypassed(&self, id: RenderPassId) -> bool {
        self.bypass_quads.contains_key(&id)
    }

    /// Quad standing in for bypassed pass `id`.
    pub fn bypass_quad(&self, id: RenderPassId) -> Option<&DrawQuad> {
        self.bypass_quads.get(&id)
    }

    /// Forget this frame's bypass decisions.
    pub fn clear_bypass(&mut self) {
        self.bypass_quads.clear();
    }

    /// Ids with a cache entry, ascending.
    pub fn pass_ids(&self) -> BTreeSet<RenderPassId> {
        self.entries.keys().copied().collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Free every texture and drop every entry.
    pub fn release_all(&mut self, allocator: &mut dyn TextureAllocator) {
        for (_, entry) in std::mem::take(&mut self.entries) {
            if let Some((texture, _)) = entry.texture {
                allocator.free_texture(texture);
            }
        }
        self.bypass_quads.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/pass_textures.rs"]
mod tests;
