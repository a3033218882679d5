use std::time::Instant;

use blockworld_common::blocks::{hotbar_slot, is_breakable};
use blockworld_common::{BlockPos, SectorKey, TextureDescriptor, WorldConfig};
use blockworld_input::{Action, motion_vector};
use blockworld_kernel::{CollisionResolver, RayHit, Resolved, World};
use blockworld_render::Renderer;
use blockworld_stream::{ChunkStreamer, HeightField, StreamConfig, StreamStats};
use blockworld_tools::{TickTimer, WorldInspector, WorldSummary};
use glam::Vec3;

use crate::actor::Actor;
use crate::error::SessionError;

/// What one call to [`Session::tick`] did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Queue commands executed this tick.
    pub drained: usize,
    /// The actor entered a new sector and visibility was re-tiled.
    pub sector_changed: bool,
    /// Present when a streaming pass ran.
    pub stream: Option<StreamStats>,
}

/// The single owner of world state: config, blocks, streaming, collision and
/// the actor.
pub struct Session<R: Renderer, H: HeightField> {
    config: WorldConfig,
    world: World<R>,
    streamer: ChunkStreamer<H>,
    collision: CollisionResolver,
    actor: Actor,
    sector: Option<SectorKey>,
    streamed_at: Vec3,
    streaming: bool,
    slot: usize,
    ticks: u64,
    timer: TickTimer,
}

impl<R: Renderer, H: HeightField> Session<R, H> {
    /// Validate `config` and stream the terrain around the spawn point.
    ///
    /// Nothing is drawn until the first tick.
    pub fn new(config: WorldConfig, renderer: R, height_field: H) -> Result<Self, SessionError> {
        config.validate()?;
        let world = World::with_config(renderer, &config);
        let streamer = ChunkStreamer::new(StreamConfig::from_world_config(&config), height_field);
        let collision = CollisionResolver::from_config(&config.physics);
        let spawn = config.spawn;
        let mut session = Self {
            world,
            streamer,
            collision,
            actor: Actor::new(spawn),
            sector: None,
            streamed_at: spawn,
            streaming: true,
            slot: 0,
            ticks: 0,
            timer: TickTimer::default(),
            config,
        };
        let stats = session
            .streamer
            .check_chunks(&mut session.world, spawn.x, spawn.z)?;
        tracing::info!(
            chunks = stats.total_loaded_chunks,
            blocks = session.world.block_count(),
            "session started"
        );
        Ok(session)
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn world(&self) -> &World<R> {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World<R> {
        &mut self.world
    }

    pub fn streamer(&self) -> &ChunkStreamer<H> {
        &self.streamer
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn timer(&self) -> &TickTimer {
        &self.timer
    }

    /// Sector visibility is currently tiled around, if any tick has run.
    pub fn sector(&self) -> Option<SectorKey> {
        self.sector
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// Block placed by `Place` actions.
    pub fn selected_block(&self) -> TextureDescriptor {
        hotbar_slot(self.slot)
    }

    pub fn world_contains(&self, pos: BlockPos) -> bool {
        self.world.contains(pos)
    }

    pub fn block_at(&self, pos: BlockPos) -> Result<TextureDescriptor, SessionError> {
        Ok(self.world.block_at(pos)?)
    }

    pub fn hit_test(&self, origin: Vec3, direction: Vec3, max_distance: u32) -> Option<RayHit> {
        self.world
            .hit_test(origin, direction, max_distance, self.config.hit_test_steps)
    }

    /// Block under the actor's line of sight within reach.
    pub fn focused_block(&self) -> Option<RayHit> {
        self.hit_test(
            self.actor.position,
            self.actor.rotation.sight_vector(),
            self.config.reach,
        )
    }

    /// Resolve a move of `delta` from `position` for a body `height` blocks tall.
    pub fn move_actor(&self, position: Vec3, delta: Vec3, height: u32) -> Resolved {
        self.collision
            .collide(self.world.store(), position + delta, height)
    }

    /// Move the actor without physics and stop its vertical motion.
    pub fn teleport(&mut self, position: Vec3) {
        self.actor.position = position;
        self.actor.vertical_velocity = 0.0;
    }

    /// Remove the block at `pos`, returning its texture.
    pub fn mine(&mut self, pos: BlockPos) -> Result<TextureDescriptor, SessionError> {
        let texture = self.world.block_at(pos)?;
        if !is_breakable(&texture) {
            tracing::warn!(%pos, "refused to mine unbreakable block");
            return Err(SessionError::Unbreakable(pos));
        }
        self.world.remove_block(pos, true)?;
        tracing::debug!(%pos, "block mined");
        Ok(texture)
    }

    /// Put `texture` at `pos` unless the actor's body is in the way.
    pub fn place(&mut self, pos: BlockPos, texture: TextureDescriptor) -> Result<(), SessionError> {
        let height = self.actor.height(&self.config.physics);
        if self.actor.body_cells(height).any(|cell| cell == pos) {
            tracing::warn!(%pos, "refused to place inside the actor");
            return Err(SessionError::Obstructed(pos));
        }
        self.world.add_block(pos, texture, true)?;
        tracing::debug!(%pos, "block placed");
        Ok(())
    }

    pub fn apply(&mut self, action: Action) -> Result<(), SessionError> {
        match action {
            Action::Mine => {
                if let Some(hit) = self.focused_block() {
                    self.mine(hit.block)?;
                }
            }
            Action::Place => {
                if let Some(RayHit {
                    previous: Some(previous),
                    ..
                }) = self.focused_block()
                {
                    self.place(previous, self.selected_block())?;
                }
            }
            Action::MineAt(pos) => {
                self.mine(pos)?;
            }
            Action::PlaceAt(pos) => self.place(pos, self.selected_block())?,
            Action::Strafe(strafe) => self.actor.strafe = strafe,
            Action::Look(rotation) => self.actor.rotation = rotation,
            Action::Jump(jumping) => self.actor.jumping = jumping,
            Action::ToggleFlight => {
                self.actor.flying = !self.actor.flying;
                tracing::info!(flying = self.actor.flying, "flight toggled");
            }
            Action::ToggleStreaming => {
                self.streaming = !self.streaming;
                tracing::info!(streaming = self.streaming, "streaming toggled");
            }
            Action::SelectSlot(slot) => self.slot = slot,
            Action::Noop => {}
        }
        Ok(())
    }

    /// Advance the session by `dt` seconds.
    ///
    /// Drains queued visibility work under the tick budget, re-tiles sector
    /// visibility when the actor changed sector (draining everything on the
    /// very first tick), runs the physics substeps and then streams if the
    /// actor moved far enough.
    pub fn tick(&mut self, dt: f32) -> Result<TickReport, SessionError> {
        let _span = tracing::debug_span!("tick", tick = self.ticks).entered();
        let start = Instant::now();
        let mut report = TickReport {
            drained: self.world.drain_budgeted(self.config.tick_budget()),
            ..TickReport::default()
        };

        let sector = SectorKey::containing(self.actor.position, self.config.sector_size);
        if self.sector != Some(sector) {
            self.world.change_sectors(self.sector, sector)?;
            if self.sector.is_none() {
                report.drained += self.world.drain_all();
            }
            self.sector = Some(sector);
            report.sector_changed = true;
        }

        let dt = dt.clamp(0.0, self.config.max_tick_dt);
        let step = dt / self.config.substeps as f32;
        for _ in 0..self.config.substeps {
            self.step(step);
        }

        if self.streaming {
            let moved = (self.actor.position - self.streamed_at).abs();
            let threshold = self.config.restream_distance;
            if moved.x >= threshold || moved.z >= threshold {
                self.streamed_at = self.actor.position;
                let stats = self.streamer.check_chunks(
                    &mut self.world,
                    self.actor.position.x,
                    self.actor.position.z,
                )?;
                report.stream = Some(stats);
            }
        }

        self.ticks += 1;
        self.timer.record(start.elapsed());
        Ok(report)
    }

    fn step(&mut self, dt: f32) {
        let physics = &self.config.physics;
        let distance = dt * self.actor.speed(physics);
        let mut delta =
            motion_vector(self.actor.rotation, self.actor.strafe, self.actor.flying) * distance;
        if self.actor.jumping && self.actor.vertical_velocity == 0.0 {
            self.actor.vertical_velocity = physics.jump_speed();
        }
        if !self.actor.flying {
            self.actor.vertical_velocity = (self.actor.vertical_velocity - dt * physics.gravity)
                .max(-physics.terminal_velocity);
            delta.y += self.actor.vertical_velocity * dt;
        }
        let height = self.actor.height(physics);
        let resolved = self.move_actor(self.actor.position, delta, height);
        self.actor.position = resolved.position;
        self.actor.vertical_velocity = resolved.vertical_velocity(self.actor.vertical_velocity);
    }

    /// Inspector summary including streaming, actor and timing state.
    pub fn summary(&self) -> WorldSummary {
        WorldInspector::summary(&self.world)
            .with_loaded_chunks(self.streamer.loaded_chunks().len())
            .with_actor(self.actor.position)
            .with_average_tick(self.timer.average())
    }
}
