use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use blockworld_common::{BlockPos, SectorKey, TextureDescriptor};
use blockworld_render::Renderer;

use crate::error::WorldError;
use crate::queue::{CommandQueue, PendingCommand};

/// Tracks which blocks are shown and owns their render primitives.
///
/// `shown` is the logical state and changes synchronously. Primitive handles
/// follow it either immediately or through the command queue. Queued commands
/// reconcile against `shown` when they run: a create for a block that is no
/// longer shown with that texture does nothing, and a destroy for a block
/// that was shown again does nothing. Once the queue is empty, `handles` and
/// `shown` have the same keys.
pub struct Visibility<R: Renderer> {
    shown: HashMap<BlockPos, TextureDescriptor>,
    handles: HashMap<BlockPos, R::Handle>,
    queue: CommandQueue,
    renderer: R,
    sector_offsets: Vec<(i32, i32)>,
}

impl<R: Renderer> Visibility<R> {
    /// `sector_pad` is the visibility radius in sectors around the observer.
    pub fn new(renderer: R, sector_pad: i32) -> Self {
        Self {
            shown: HashMap::new(),
            handles: HashMap::new(),
            queue: CommandQueue::new(),
            renderer,
            sector_offsets: circular_offsets(sector_pad),
        }
    }

    pub fn is_shown(&self, pos: BlockPos) -> bool {
        self.shown.contains_key(&pos)
    }

    pub fn shown(&self) -> &HashMap<BlockPos, TextureDescriptor> {
        &self.shown
    }

    /// Positions that currently own a render primitive.
    pub fn primitive_positions(&self) -> impl Iterator<Item = &BlockPos> {
        self.handles.keys()
    }

    pub fn primitive_count(&self) -> usize {
        self.handles.len()
    }

    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Footprint offsets `(dx, dz)` used around an observer sector.
    pub fn sector_offsets(&self) -> &[(i32, i32)] {
        &self.sector_offsets
    }

    /// Sectors within the circular footprint around `center`.
    pub fn footprint(&self, center: SectorKey) -> BTreeSet<SectorKey> {
        self.sector_offsets
            .iter()
            .map(|&(dx, dz)| center.offset(dx, dz))
            .collect()
    }

    /// Mark `pos` shown and create its primitive now or through the queue.
    pub fn show(
        &mut self,
        pos: BlockPos,
        texture: TextureDescriptor,
        immediate: bool,
    ) -> Result<(), WorldError> {
        if self.shown.contains_key(&pos) {
            return Err(WorldError::IllegalState {
                pos,
                reason: "block is already shown",
            });
        }
        self.shown.insert(pos, texture);
        tracing::debug!(%pos, immediate, "block shown");
        let command = PendingCommand::Create { pos, texture };
        if immediate {
            execute(&self.shown, &mut self.handles, &mut self.renderer, command);
        } else {
            self.queue.enqueue(command);
        }
        Ok(())
    }

    /// Mark `pos` hidden and destroy its primitive now or through the queue.
    pub fn hide(&mut self, pos: BlockPos, immediate: bool) -> Result<(), WorldError> {
        if self.shown.remove(&pos).is_none() {
            return Err(WorldError::IllegalState {
                pos,
                reason: "block is not shown",
            });
        }
        tracing::debug!(%pos, immediate, "block hidden");
        let command = PendingCommand::Destroy { pos };
        if immediate {
            execute(&self.shown, &mut self.handles, &mut self.renderer, command);
        } else {
            self.queue.enqueue(command);
        }
        Ok(())
    }

    /// Run queued commands until the queue empties or `budget` elapses.
    pub fn drain_budgeted(&mut self, budget: Duration) -> usize {
        let Self {
            shown,
            handles,
            queue,
            renderer,
            ..
        } = self;
        queue.drain_budgeted(budget, |command| execute(shown, handles, renderer, command))
    }

    /// Run every queued command.
    pub fn drain_all(&mut self) -> usize {
        let Self {
            shown,
            handles,
            queue,
            renderer,
            ..
        } = self;
        queue.drain_all(|command| execute(shown, handles, renderer, command))
    }
}

fn execute<R: Renderer>(
    shown: &HashMap<BlockPos, TextureDescriptor>,
    handles: &mut HashMap<BlockPos, R::Handle>,
    renderer: &mut R,
    command: PendingCommand,
) {
    match command {
        PendingCommand::Create { pos, texture } => {
            if shown.get(&pos) != Some(&texture) {
                tracing::trace!(%pos, "stale create skipped");
                return;
            }
            if let Some(old) = handles.remove(&pos) {
                renderer.destroy_primitive(old);
            }
            let handle = renderer.create_primitive(pos, &texture);
            handles.insert(pos, handle);
        }
        PendingCommand::Destroy { pos } => {
            if shown.contains_key(&pos) {
                tracing::trace!(%pos, "stale destroy skipped");
                return;
            }
            if let Some(handle) = handles.remove(&pos) {
                renderer.destroy_primitive(handle);
            }
        }
    }
}

/// Offsets `(dx, dz)` with `|dx|, |dz| <= pad` inside the circle of radius `pad + 1`.
pub fn circular_offsets(pad: i32) -> Vec<(i32, i32)> {
    let limit = i64::from(pad) + 1;
    let limit = limit * limit;
    let mut offsets = Vec::new();
    for dx in -pad..=pad {
        for dz in -pad..=pad {
            let (x, z) = (i64::from(dx), i64::from(dz));
            if x * x + z * z <= limit {
                offsets.push((dx, dz));
            }
        }
    }
    offsets
}
