use std::collections::BTreeMap;

use blockworld_common::{BlockPos, TextureDescriptor};

/// Renderer-side interface the world model draws through.
///
/// The world asks for one primitive per visible block and hands the handle
/// back when the block stops being visible. The renderer never reads or
/// mutates world state on its own.
pub trait Renderer {
    /// Opaque token for one drawn block.
    type Handle;

    /// Create the drawable for a block at `pos`.
    fn create_primitive(&mut self, pos: BlockPos, texture: &TextureDescriptor) -> Self::Handle;

    /// Release a drawable previously returned by `create_primitive`.
    fn destroy_primitive(&mut self, handle: Self::Handle);
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    type Handle = R::Handle;

    fn create_primitive(&mut self, pos: BlockPos, texture: &TextureDescriptor) -> Self::Handle {
        (**self).create_primitive(pos, texture)
    }

    fn destroy_primitive(&mut self, handle: Self::Handle) {
        (**self).destroy_primitive(handle)
    }
}

/// Renderer that draws nothing. For headless runs and benchmarks.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    type Handle = ();

    fn create_primitive(&mut self, _pos: BlockPos, _texture: &TextureDescriptor) {}

    fn destroy_primitive(&mut self, _handle: ()) {}
}

/// Handle issued by [`RecordingRenderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveId(pub u64);

/// A live primitive as the recording renderer sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Primitive {
    pub pos: BlockPos,
    pub texture: TextureDescriptor,
}

/// Renderer that keeps a ledger of live primitives instead of drawing.
///
/// Lets the CLI and tests observe exactly what the world asked to draw.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    live: BTreeMap<PrimitiveId, Primitive>,
    next_id: u64,
    created: u64,
    destroyed: u64,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Primitives created and not yet destroyed.
    pub fn live(&self) -> &BTreeMap<PrimitiveId, Primitive> {
        &self.live
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Live primitives drawn at `pos`. More than one means a leak.
    pub fn count_at(&self, pos: BlockPos) -> usize {
        self.live.values().filter(|p| p.pos == pos).count()
    }

    pub fn created(&self) -> u64 {
        self.created
    }

    pub fn destroyed(&self) -> u64 {
        self.destroyed
    }

    /// One-line ledger summary.
    pub fn describe(&self) -> String {
        format!(
            "primitives: live={} created={} destroyed={}",
            self.live.len(),
            self.created,
            self.destroyed
        )
    }
}

impl Renderer for RecordingRenderer {
    type Handle = PrimitiveId;

    fn create_primitive(&mut self, pos: BlockPos, texture: &TextureDescriptor) -> PrimitiveId {
        let id = PrimitiveId(self.next_id);
        self.next_id += 1;
        self.created += 1;
        self.live.insert(
            id,
            Primitive {
                pos,
                texture: *texture,
            },
        );
        tracing::trace!(?id, %pos, "primitive created");
        id
    }

    fn destroy_primitive(&mut self, handle: PrimitiveId) {
        if self.live.remove(&handle).is_some() {
            self.destroyed += 1;
            tracing::trace!(id = ?handle, "primitive destroyed");
        } else {
            tracing::warn!(id = ?handle, "destroy of unknown primitive");
        }
    }
}
