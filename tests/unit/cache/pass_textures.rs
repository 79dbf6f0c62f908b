use super::*;
use crate::cache::bypass::SingleTileBypass;
use crate::foundation::core::{Rect, ResourceId};
use crate::model::quad::SharedQuadState;

#[derive(Default)]
struct MockAllocator {
    next: u64,
    live: BTreeSet<TextureId>,
    calls: Vec<&'static str>,
    fail: bool,
}

impl TextureAllocator for MockAllocator {
    fn allocate_texture(&mut self, _desc: &TextureDesc) -> CompositorResult<TextureId> {
        self.calls.push("allocate_texture");
        if self.fail {
            return Err(CompositorError::resource("out of texture memory"));
        }
        self.next += 1;
        let id = TextureId(self.next);
        self.live.insert(id);
        Ok(id)
    }

    fn free_texture(&mut self, id: TextureId) {
        self.calls.push("free_texture");
        assert!(self.live.remove(&id), "double free of {id:?}");
    }
}

fn pass(id: u64, w: f64, h: f64) -> RenderPass {
    RenderPass::new(RenderPassId(id), Rect::new(0.0, 0.0, w, h))
}

fn frame(children: &[(u64, f64, f64)]) -> Vec<RenderPass> {
    let mut passes: Vec<RenderPass> = children.iter().map(|&(id, w, h)| pass(id, w, h)).collect();
    passes.push(pass(1, 800.0, 600.0));
    passes
}

#[test]
fn root_pass_gets_no_entry() {
    let mut cache = RenderPassTextureCache::default();
    let mut alloc = MockAllocator::default();
    let stats = cache.reconcile_for_frame(&frame(&[(2, 64.0, 64.0)]), ColorSpace::Srgb, &mut alloc);
    assert_eq!(stats.added, 1);
    assert!(cache.entry(RenderPassId(1)).is_none());
    assert!(cache.entry(RenderPassId(2)).is_some());
    assert!(alloc.calls.is_empty());
}

#[test]
fn get_before_first_use_returns_nothing() {
    let mut cache = RenderPassTextureCache::default();
    let mut alloc = MockAllocator::default();
    assert!(cache.get(RenderPassId(2)).is_none());
    cache.reconcile_for_frame(&frame(&[(2, 64.0, 64.0)]), ColorSpace::Srgb, &mut alloc);
    assert!(cache.get(RenderPassId(2)).is_none());

    let texture = cache.ensure_allocated(RenderPassId(2), &mut alloc).unwrap();
    assert_eq!(cache.get(RenderPassId(2)), Some(texture));
    assert!(cache.has_resource(RenderPassId(2)));
    assert_eq!(cache.ensure_allocated(RenderPassId(2), &mut alloc).unwrap(), texture);
    assert_eq!(alloc.calls, vec!["allocate_texture"]);
}

#[test]
fn unknown_pass_cannot_be_allocated() {
    let mut cache = RenderPassTextureCache::default();
    let mut alloc = MockAllocator::default();
    let err = cache.ensure_allocated(RenderPassId(9), &mut alloc).unwrap_err();
    assert!(err.is_recoverable());
}

#[test]
fn reconcile_twice_is_idempotent() {
    let mut cache = RenderPassTextureCache::default();
    let mut alloc = MockAllocator::default();
    let passes = frame(&[(2, 64.0, 64.0), (3, 10.0, 20.0)]);
    cache.reconcile_for_frame(&passes, ColorSpace::Srgb, &mut alloc);
    cache.ensure_allocated(RenderPassId(2), &mut alloc).unwrap();
    cache.ensure_allocated(RenderPassId(3), &mut alloc).unwrap();
    let before = alloc.calls.len();

    let stats = cache.reconcile_for_frame(&passes, ColorSpace::Srgb, &mut alloc);
    assert_eq!(stats, ReconcileStats::default());
    assert_eq!(alloc.calls.len(), before);
    assert!(cache.has_resource(RenderPassId(2)));
    assert!(cache.has_resource(RenderPassId(3)));
}

#[test]
fn removed_pass_is_evicted_and_freed() {
    let mut cache = RenderPassTextureCache::default();
    let mut alloc = MockAllocator::default();
    cache.reconcile_for_frame(&frame(&[(2, 64.0, 64.0), (3, 8.0, 8.0)]), ColorSpace::Srgb, &mut alloc);
    cache.ensure_allocated(RenderPassId(3), &mut alloc).unwrap();

    let stats = cache.reconcile_for_frame(&frame(&[(2, 64.0, 64.0)]), ColorSpace::Srgb, &mut alloc);
    assert_eq!(stats.evicted, 1);
    assert!(cache.entry(RenderPassId(3)).is_none());
    assert!(alloc.live.is_empty());
    assert_eq!(cache.pass_ids(), BTreeSet::from([RenderPassId(2)]));
}

#[test]
fn undersized_texture_is_freed_but_entry_kept() {
    let mut cache = RenderPassTextureCache::default();
    let mut alloc = MockAllocator::default();
    cache.reconcile_for_frame(&frame(&[(2, 64.0, 64.0)]), ColorSpace::Srgb, &mut alloc);
    cache.ensure_allocated(RenderPassId(2), &mut alloc).unwrap();

    // Shrinking keeps the larger texture.
    let stats = cache.reconcile_for_frame(&frame(&[(2, 32.0, 32.0)]), ColorSpace::Srgb, &mut alloc);
    assert_eq!(stats.freed, 0);
    assert!(cache.has_resource(RenderPassId(2)));

    let stats = cache.reconcile_for_frame(&frame(&[(2, 65.0, 64.0)]), ColorSpace::Srgb, &mut alloc);
    assert_eq!(stats.freed, 1);
    let entry = cache.entry(RenderPassId(2)).unwrap();
    assert!(entry.texture().is_none());
    assert_eq!(entry.required().size, PixelSize::new(65, 64));

    cache.ensure_allocated(RenderPassId(2), &mut alloc).unwrap();
    assert_eq!(
        cache.entry(RenderPassId(2)).unwrap().allocated_size(),
        Some(PixelSize::new(65, 64))
    );
}

#[test]
fn mipmap_requirement_forces_reallocation() {
    let mut cache = RenderPassTextureCache::default();
    let mut alloc = MockAllocator::default();
    cache.reconcile_for_frame(&frame(&[(2, 64.0, 64.0)]), ColorSpace::Srgb, &mut alloc);
    cache.ensure_allocated(RenderPassId(2), &mut alloc).unwrap();

    let mut passes = frame(&[(2, 64.0, 64.0)]);
    passes[0].generate_mipmap = true;
    let stats = cache.reconcile_for_frame(&passes, ColorSpace::Srgb, &mut alloc);
    assert_eq!(stats.freed, 1);
    assert!(cache.entry(RenderPassId(2)).unwrap().required().hint.mipmap);
}

#[test]
fn enlargement_applies_to_requested_size() {
    let mut cache = RenderPassTextureCache::default().with_enlargement(PixelSize::new(4, 2));
    let mut alloc = MockAllocator::default();
    cache.reconcile_for_frame(&frame(&[(2, 10.5, 10.0)]), ColorSpace::Srgb, &mut alloc);
    assert_eq!(
        cache.entry(RenderPassId(2)).unwrap().required().size,
        PixelSize::new(15, 12)
    );
}

#[test]
fn allocation_failure_leaves_entry_empty() {
    let mut cache = RenderPassTextureCache::default();
    let mut alloc = MockAllocator {
        fail: true,
        ..MockAllocator::default()
    };
    cache.reconcile_for_frame(&frame(&[(2, 64.0, 64.0)]), ColorSpace::Srgb, &mut alloc);
    assert!(cache.ensure_allocated(RenderPassId(2), &mut alloc).is_err());
    assert!(!cache.has_resource(RenderPassId(2)));
}

#[test]
fn bypassed_pass_gets_no_entry() {
    let mut cache = RenderPassTextureCache::new(Box::new(SingleTileBypass::default()));
    let mut alloc = MockAllocator::default();
    let mut passes = frame(&[(2, 64.0, 64.0), (3, 64.0, 64.0)]);
    passes[0].push_quad(DrawQuad::tile(
        Rect::new(0.0, 0.0, 64.0, 64.0),
        ResourceId(42),
        PixelSize::new(64, 64),
        SharedQuadState::default(),
    ));

    let stats = cache.reconcile_for_frame(&passes, ColorSpace::Srgb, &mut alloc);
    assert_eq!(stats.bypassed, 1);
    assert!(cache.is_bypassed(RenderPassId(2)));
    assert!(cache.entry(RenderPassId(2)).is_none());
    assert!(cache.entry(RenderPassId(3)).is_some());
    assert!(matches!(
        cache.bypass_quad(RenderPassId(2)).map(|q| &q.material),
        Some(crate::model::quad::Material::Tile { .. })
    ));

    cache.clear_bypass();
    assert!(!cache.is_bypassed(RenderPassId(2)));
}

#[test]
fn release_all_frees_every_texture() {
    let mut cache = RenderPassTextureCache::default();
    let mut alloc = MockAllocator::default();
    cache.reconcile_for_frame(&frame(&[(2, 8.0, 8.0), (3, 8.0, 8.0)]), ColorSpace::Srgb, &mut alloc);
    cache.ensure_allocated(RenderPassId(2), &mut alloc).unwrap();
    cache.ensure_allocated(RenderPassId(3), &mut alloc).unwrap();

    cache.release_all(&mut alloc);
    assert!(cache.is_empty());
    assert!(alloc.live.is_empty());
}
