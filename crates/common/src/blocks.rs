use serde::{Deserialize, Serialize};

/// Tiles per row and column of the block texture atlas.
pub const ATLAS_TILES: u8 = 16;

/// A square in the texture atlas, addressed by column and row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AtlasTile {
    pub col: u8,
    pub row: u8,
}

impl AtlasTile {
    pub const fn new(col: u8, row: u8) -> Self {
        Self { col, row }
    }

    /// Corners of the tile in UV space, counter-clockwise from the bottom left.
    pub fn uv_corners(self) -> [f32; 8] {
        let m = 1.0 / ATLAS_TILES as f32;
        let u = self.col as f32 * m;
        let v = self.row as f32 * m;
        [u, v, u + m, v, u + m, v + m, u, v + m]
    }
}

/// Which atlas squares a block renders with.
///
/// Immutable once a block is created; the renderer only ever reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureDescriptor {
    pub top: AtlasTile,
    pub bottom: AtlasTile,
    pub side: AtlasTile,
}

impl TextureDescriptor {
    pub const fn new(top: AtlasTile, bottom: AtlasTile, side: AtlasTile) -> Self {
        Self { top, bottom, side }
    }

    /// Same tile on every face.
    pub const fn uniform(tile: AtlasTile) -> Self {
        Self::new(tile, tile, tile)
    }

    /// UV coordinates for the 24 cube vertices: top, bottom, then the four sides.
    pub fn uv_quads(&self) -> [f32; 48] {
        let mut out = [0.0; 48];
        let faces = [
            self.top,
            self.bottom,
            self.side,
            self.side,
            self.side,
            self.side,
        ];
        for (chunk, tile) in out.chunks_exact_mut(8).zip(faces) {
            chunk.copy_from_slice(&tile.uv_corners());
        }
        out
    }
}

pub const GRASS: TextureDescriptor = TextureDescriptor::new(
    AtlasTile::new(1, 0),
    AtlasTile::new(0, 1),
    AtlasTile::new(0, 0),
);
pub const SAND: TextureDescriptor = TextureDescriptor::uniform(AtlasTile::new(1, 1));
pub const BRICK: TextureDescriptor = TextureDescriptor::uniform(AtlasTile::new(2, 0));
pub const STONE: TextureDescriptor = TextureDescriptor::uniform(AtlasTile::new(2, 1));
pub const END_PORTAL_FRAME: TextureDescriptor = TextureDescriptor::new(
    AtlasTile::new(1, 2),
    AtlasTile::new(2, 2),
    AtlasTile::new(0, 2),
);
pub const CRAFTING_TABLE: TextureDescriptor = TextureDescriptor::new(
    AtlasTile::new(0, 3),
    AtlasTile::new(0, 3),
    AtlasTile::new(1, 3),
);
pub const OBSIDIAN: TextureDescriptor = TextureDescriptor::uniform(AtlasTile::new(3, 0));
pub const DIAMOND_ORE: TextureDescriptor = TextureDescriptor::uniform(AtlasTile::new(3, 2));

/// Placeable blocks in hotbar order.
pub const HOTBAR: [TextureDescriptor; 7] = [
    BRICK,
    GRASS,
    SAND,
    END_PORTAL_FRAME,
    OBSIDIAN,
    CRAFTING_TABLE,
    DIAMOND_ORE,
];

/// Hotbar entry for a number key slot; slots wrap around the hotbar.
pub fn hotbar_slot(slot: usize) -> TextureDescriptor {
    HOTBAR[slot % HOTBAR.len()]
}

/// Whether a mine action may remove this block.
pub fn is_breakable(texture: &TextureDescriptor) -> bool {
    *texture != STONE
}
