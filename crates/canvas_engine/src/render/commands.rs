//! Packed render command stream
//!
//! Tree traversal writes draw intents here; the render system replays them
//! once against the drawing surface. Opcodes live in a byte buffer and their
//! operands in a flat `f32` buffer, so recording a frame allocates nothing
//! once the buffers have reached their working size.
//!
//! Two kinds of state are coalesced while recording:
//!
//! - Transform pushes are held back until a draw needs them. Identity pushes
//!   are never emitted, and a subtree that draws nothing emits nothing.
//! - `SetMaterial` / `SetOpacity` are only emitted when the value differs from
//!   the last one emitted.
//!
//! Ids and tile counts travel as the raw bits of their operand, so they
//! survive the `f32` buffer exactly whatever their size.
//!
//! Replay tracks the transform stack itself, so pops never revert material or
//! opacity state and the dedup above stays valid for the whole frame.

use crate::assets::ImageId;
use crate::foundation::collections::DynamicBuffer;
use crate::foundation::math::{Affine2D, Vec2};
use crate::render::material::MaterialId;

fn int_operand(value: u32) -> f32 {
    f32::from_bits(value)
}

fn operand_int(value: f32) -> u32 {
    value.to_bits()
}

/// Command opcodes
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// Multiply the current transform (6 operands: a b c d e f)
    PushTransform = 1,
    /// Restore the transform before the matching push (0 operands)
    PopTransform = 2,
    /// Select a material (1 operand: id)
    SetMaterial = 3,
    /// Set the global alpha (1 operand)
    SetOpacity = 4,
    /// Rectangle (8 operands: x y w h repeat_x repeat_y gap_x gap_y)
    DrawRect = 5,
    /// Ellipse inscribed in a rectangle (8 operands, as `DrawRect`)
    DrawEllipse = 6,
    /// Line segment (4 operands: x1 y1 x2 y2)
    DrawLine = 7,
    /// Image (9 operands: image id, then as `DrawRect`)
    DrawImage = 8,
    /// Text (5 operands: text id, x, y, font size, align)
    DrawText = 9,
}

impl Opcode {
    /// Decode a raw opcode byte
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            1 => Self::PushTransform,
            2 => Self::PopTransform,
            3 => Self::SetMaterial,
            4 => Self::SetOpacity,
            5 => Self::DrawRect,
            6 => Self::DrawEllipse,
            7 => Self::DrawLine,
            8 => Self::DrawImage,
            9 => Self::DrawText,
            _ => return None,
        })
    }

    /// Number of `f32` operands following this opcode
    pub fn operand_count(self) -> usize {
        match self {
            Self::PushTransform => 6,
            Self::PopTransform => 0,
            Self::SetMaterial | Self::SetOpacity => 1,
            Self::DrawRect | Self::DrawEllipse => 8,
            Self::DrawLine => 4,
            Self::DrawImage => 9,
            Self::DrawText => 5,
        }
    }

    /// True for the draw opcodes
    pub fn is_draw(self) -> bool {
        matches!(
            self,
            Self::DrawRect | Self::DrawEllipse | Self::DrawLine | Self::DrawImage | Self::DrawText
        )
    }
}

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum TextAlign {
    /// Anchor at the left edge
    #[default]
    Left,
    /// Anchor at the center
    Center,
    /// Anchor at the right edge
    Right,
}

impl TextAlign {
    fn to_operand(self) -> f32 {
        match self {
            Self::Left => 0.0,
            Self::Center => 1.0,
            Self::Right => 2.0,
        }
    }

    fn from_operand(value: f32) -> Self {
        match value as i32 {
            1 => Self::Center,
            2 => Self::Right,
            _ => Self::Left,
        }
    }
}

/// Rectangle-shaped draw with optional grid repetition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeDraw {
    /// Top-left corner in local space
    pub position: Vec2,
    /// Width and height
    pub size: Vec2,
    /// Copies along x and y (1, 1 for a single draw)
    pub repeat: (u32, u32),
    /// Extra spacing between copies
    pub gap: Vec2,
}

impl ShapeDraw {
    /// Single shape, no tiling
    pub fn single(position: Vec2, size: Vec2) -> Self {
        Self { position, size, repeat: (1, 1), gap: Vec2::zeros() }
    }

    /// Top-left corner of each tile, row by row
    pub fn tiles(&self) -> impl Iterator<Item = Vec2> + '_ {
        let step = self.size + self.gap;
        (0..self.repeat.1).flat_map(move |row| {
            (0..self.repeat.0).map(move |col| {
                self.position + Vec2::new(step.x * col as f32, step.y * row as f32)
            })
        })
    }

    fn operands(&self) -> [f32; 8] {
        [
            self.position.x,
            self.position.y,
            self.size.x,
            self.size.y,
            int_operand(self.repeat.0),
            int_operand(self.repeat.1),
            self.gap.x,
            self.gap.y,
        ]
    }

    fn from_operands(values: &[f32]) -> Self {
        Self {
            position: Vec2::new(values[0], values[1]),
            size: Vec2::new(values[2], values[3]),
            repeat: (operand_int(values[4]), operand_int(values[5])),
            gap: Vec2::new(values[6], values[7]),
        }
    }
}

/// Decoded command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderCommand {
    /// Multiply the current transform
    PushTransform(Affine2D),
    /// Undo the matching push
    PopTransform,
    /// Select a material
    SetMaterial(MaterialId),
    /// Set global alpha
    SetOpacity(f32),
    /// Draw a rectangle
    DrawRect(ShapeDraw),
    /// Draw an ellipse
    DrawEllipse(ShapeDraw),
    /// Draw a line segment
    DrawLine {
        /// Start point
        from: Vec2,
        /// End point
        to: Vec2,
    },
    /// Draw an image
    DrawImage {
        /// Image to draw
        image: ImageId,
        /// Destination rectangle(s)
        shape: ShapeDraw,
    },
    /// Draw interned text
    DrawText {
        /// Interned string id
        text_id: u32,
        /// Anchor point
        position: Vec2,
        /// Font size in local units
        font_size: f32,
        /// Alignment relative to the anchor
        align: TextAlign,
    },
}

#[derive(Debug, Clone, Copy)]
enum PushState {
    Pending(Affine2D),
    Emitted,
    Skipped,
}

#[derive(Debug, Clone, Copy)]
struct PushFrame {
    state: PushState,
    opacity: f32,
}

/// Recorded frame of draw intents
#[derive(Debug)]
pub struct RenderCommandStream {
    opcodes: DynamicBuffer<u8>,
    operands: DynamicBuffer<f32>,
    stack: Vec<PushFrame>,
    flushed_depth: usize,
    current_material: Option<MaterialId>,
    current_opacity: Option<f32>,
}

impl Default for RenderCommandStream {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderCommandStream {
    /// Create an empty stream
    pub fn new() -> Self {
        Self {
            opcodes: DynamicBuffer::with_capacity(1024),
            operands: DynamicBuffer::with_capacity(4096),
            stack: Vec::new(),
            flushed_depth: 0,
            current_material: None,
            current_opacity: None,
        }
    }

    /// Reset for a new frame, keeping buffer capacity
    pub fn clear(&mut self) {
        self.opcodes.clear();
        self.operands.clear();
        self.stack.clear();
        self.flushed_depth = 0;
        self.current_material = None;
        self.current_opacity = None;
    }

    /// Open a transform scope with a local matrix and opacity factor
    pub fn push_transform(&mut self, matrix: &Affine2D, opacity: f32) {
        let parent_opacity = self.stack.last().map_or(1.0, |frame| frame.opacity);
        let state = if matrix.is_identity() {
            PushState::Skipped
        } else {
            PushState::Pending(*matrix)
        };
        self.stack.push(PushFrame { state, opacity: parent_opacity * opacity });
    }

    /// Close the innermost transform scope
    pub fn pop_transform(&mut self) {
        match self.stack.pop() {
            Some(PushFrame { state: PushState::Emitted, .. }) => {
                self.opcodes.push(Opcode::PopTransform as u8);
            }
            Some(_) => {}
            None => log::warn!("pop_transform without matching push"),
        }
        self.flushed_depth = self.flushed_depth.min(self.stack.len());
    }

    /// Cumulative opacity of the open scopes
    pub fn current_opacity(&self) -> f32 {
        self.stack.last().map_or(1.0, |frame| frame.opacity)
    }

    /// Open scope depth
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Rectangle
    pub fn draw_rect(&mut self, material: MaterialId, opacity: f32, shape: &ShapeDraw) {
        if self.prepare_draw(Some(material), opacity) {
            self.emit(Opcode::DrawRect, &shape.operands());
        }
    }

    /// Ellipse inscribed in the shape rectangle
    pub fn draw_ellipse(&mut self, material: MaterialId, opacity: f32, shape: &ShapeDraw) {
        if self.prepare_draw(Some(material), opacity) {
            self.emit(Opcode::DrawEllipse, &shape.operands());
        }
    }

    /// Line segment
    pub fn draw_line(&mut self, material: MaterialId, opacity: f32, from: Vec2, to: Vec2) {
        if self.prepare_draw(Some(material), opacity) {
            self.emit(Opcode::DrawLine, &[from.x, from.y, to.x, to.y]);
        }
    }

    /// Image into the shape rectangle
    pub fn draw_image(&mut self, image: ImageId, opacity: f32, shape: &ShapeDraw) {
        if self.prepare_draw(None, opacity) {
            let mut operands = [0.0; 9];
            operands[0] = int_operand(image.0);
            operands[1..].copy_from_slice(&shape.operands());
            self.emit(Opcode::DrawImage, &operands);
        }
    }

    /// Interned text
    pub fn draw_text(
        &mut self,
        material: MaterialId,
        opacity: f32,
        text_id: u32,
        position: Vec2,
        font_size: f32,
        align: TextAlign,
    ) {
        if self.prepare_draw(Some(material), opacity) {
            self.emit(
                Opcode::DrawText,
                &[int_operand(text_id), position.x, position.y, font_size, align.to_operand()],
            );
        }
    }

    /// Flush deferred state for a draw; false when the draw is invisible
    fn prepare_draw(&mut self, material: Option<MaterialId>, opacity: f32) -> bool {
        let opacity = (self.current_opacity() * opacity).clamp(0.0, 1.0);
        if opacity <= 0.0 {
            return false;
        }

        for index in self.flushed_depth..self.stack.len() {
            if let PushState::Pending(matrix) = self.stack[index].state {
                self.opcodes.push(Opcode::PushTransform as u8);
                self.operands.extend_from_slice(&matrix.to_array());
                self.stack[index].state = PushState::Emitted;
            }
        }
        self.flushed_depth = self.stack.len();

        if let Some(material) = material {
            if self.current_material != Some(material) {
                self.emit(Opcode::SetMaterial, &[int_operand(material.0)]);
                self.current_material = Some(material);
            }
        }
        if self.current_opacity != Some(opacity) {
            self.emit(Opcode::SetOpacity, &[opacity]);
            self.current_opacity = Some(opacity);
        }
        true
    }

    fn emit(&mut self, opcode: Opcode, operands: &[f32]) {
        debug_assert_eq!(operands.len(), opcode.operand_count());
        self.opcodes.push(opcode as u8);
        self.operands.extend_from_slice(operands);
    }

    /// Number of recorded opcodes
    pub fn len(&self) -> usize {
        self.opcodes.len()
    }

    /// True when nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.opcodes.is_empty()
    }

    /// Raw opcode bytes
    pub fn opcodes(&self) -> &[u8] {
        self.opcodes.as_slice()
    }

    /// Count of a given opcode
    pub fn count(&self, opcode: Opcode) -> usize {
        self.opcodes.as_slice().iter().filter(|&&op| op == opcode as u8).count()
    }

    /// Count of draw opcodes
    pub fn draw_count(&self) -> usize {
        self.opcodes
            .as_slice()
            .iter()
            .filter(|&&op| Opcode::from_u8(op).is_some_and(Opcode::is_draw))
            .count()
    }

    /// Total recorded size in bytes
    pub fn byte_len(&self) -> usize {
        self.opcodes.byte_len() + self.operands.byte_len()
    }

    /// Decode the stream in order
    pub fn commands(&self) -> CommandIter<'_> {
        CommandIter { stream: self, opcode_index: 0, operand_index: 0 }
    }
}

/// Decoding iterator over a [`RenderCommandStream`]
pub struct CommandIter<'a> {
    stream: &'a RenderCommandStream,
    opcode_index: usize,
    operand_index: usize,
}

impl Iterator for CommandIter<'_> {
    type Item = RenderCommand;

    fn next(&mut self) -> Option<RenderCommand> {
        let raw = self.stream.opcodes.get(self.opcode_index)?;
        let Some(opcode) = Opcode::from_u8(raw) else {
            log::warn!("Corrupt render stream: opcode {raw} at {}", self.opcode_index);
            return None;
        };
        let count = opcode.operand_count();
        let operands = self
            .stream
            .operands
            .as_slice()
            .get(self.operand_index..self.operand_index + count)?;
        self.opcode_index += 1;
        self.operand_index += count;

        Some(match opcode {
            Opcode::PushTransform => RenderCommand::PushTransform(Affine2D::from_array([
                operands[0], operands[1], operands[2], operands[3], operands[4], operands[5],
            ])),
            Opcode::PopTransform => RenderCommand::PopTransform,
            Opcode::SetMaterial => RenderCommand::SetMaterial(MaterialId(operand_int(operands[0]))),
            Opcode::SetOpacity => RenderCommand::SetOpacity(operands[0]),
            Opcode::DrawRect => RenderCommand::DrawRect(ShapeDraw::from_operands(operands)),
            Opcode::DrawEllipse => RenderCommand::DrawEllipse(ShapeDraw::from_operands(operands)),
            Opcode::DrawLine => RenderCommand::DrawLine {
                from: Vec2::new(operands[0], operands[1]),
                to: Vec2::new(operands[2], operands[3]),
            },
            Opcode::DrawImage => RenderCommand::DrawImage {
                image: ImageId(operand_int(operands[0])),
                shape: ShapeDraw::from_operands(&operands[1..]),
            },
            Opcode::DrawText => RenderCommand::DrawText {
                text_id: operand_int(operands[0]),
                position: Vec2::new(operands[1], operands[2]),
                font_size: operands[3],
                align: TextAlign::from_operand(operands[4]),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_rect() -> ShapeDraw {
        ShapeDraw::single(Vec2::zeros(), Vec2::new(1.0, 1.0))
    }

    #[test]
    fn test_pushes_without_draws_emit_nothing() {
        let mut stream = RenderCommandStream::new();
        stream.push_transform(&Affine2D::translation(Vec2::new(5.0, 5.0)), 1.0);
        stream.push_transform(&Affine2D::rotation_degrees(45.0), 1.0);
        stream.pop_transform();
        stream.pop_transform();
        assert!(stream.is_empty());
    }

    #[test]
    fn test_pending_pushes_flush_before_draw() {
        let mut stream = RenderCommandStream::new();
        let outer = Affine2D::translation(Vec2::new(5.0, 0.0));
        stream.push_transform(&outer, 1.0);
        stream.push_transform(&Affine2D::identity(), 1.0);
        stream.draw_rect(MaterialId(0), 1.0, &unit_rect());
        stream.pop_transform();
        stream.pop_transform();

        let commands: Vec<_> = stream.commands().collect();
        assert_eq!(commands, vec![
            RenderCommand::PushTransform(outer),
            RenderCommand::SetMaterial(MaterialId(0)),
            RenderCommand::SetOpacity(1.0),
            RenderCommand::DrawRect(unit_rect()),
            RenderCommand::PopTransform,
        ]);
    }

    #[test]
    fn test_sibling_scopes_only_emit_when_drawn() {
        let mut stream = RenderCommandStream::new();
        let parent = Affine2D::translation(Vec2::new(1.0, 0.0));
        let empty_child = Affine2D::translation(Vec2::new(0.0, 1.0));
        let drawn_child = Affine2D::scale(Vec2::new(2.0, 2.0));

        stream.push_transform(&parent, 1.0);
        stream.push_transform(&empty_child, 1.0);
        stream.pop_transform();
        stream.push_transform(&drawn_child, 1.0);
        stream.draw_ellipse(MaterialId(1), 1.0, &unit_rect());
        stream.pop_transform();
        stream.pop_transform();

        assert_eq!(stream.count(Opcode::PushTransform), 2);
        assert_eq!(stream.count(Opcode::PopTransform), 2);
        let pushes: Vec<_> = stream
            .commands()
            .filter_map(|c| match c {
                RenderCommand::PushTransform(m) => Some(m),
                _ => None,
            })
            .collect();
        assert_eq!(pushes, vec![parent, drawn_child]);
    }

    #[test]
    fn test_material_and_opacity_dedup() {
        let mut stream = RenderCommandStream::new();
        stream.draw_rect(MaterialId(3), 1.0, &unit_rect());
        stream.draw_rect(MaterialId(3), 1.0, &unit_rect());
        stream.draw_line(MaterialId(3), 1.0, Vec2::zeros(), Vec2::new(1.0, 1.0));
        stream.draw_rect(MaterialId(4), 1.0, &unit_rect());
        stream.draw_rect(MaterialId(4), 0.5, &unit_rect());

        assert_eq!(stream.count(Opcode::SetMaterial), 2);
        assert_eq!(stream.count(Opcode::SetOpacity), 2);
        assert_eq!(stream.draw_count(), 5);
    }

    #[test]
    fn test_cumulative_opacity_and_invisible_draws() {
        let mut stream = RenderCommandStream::new();
        stream.push_transform(&Affine2D::identity(), 0.5);
        stream.push_transform(&Affine2D::identity(), 0.5);
        assert!((stream.current_opacity() - 0.25).abs() < 1e-6);
        stream.draw_rect(MaterialId(0), 1.0, &unit_rect());
        stream.draw_rect(MaterialId(0), 0.0, &unit_rect());
        stream.pop_transform();
        stream.pop_transform();

        assert_eq!(stream.draw_count(), 1);
        assert!(stream.commands().any(|c| c == RenderCommand::SetOpacity(0.25)));
    }

    #[test]
    fn test_image_and_text_decode() {
        let mut stream = RenderCommandStream::new();
        let shape = ShapeDraw { position: Vec2::new(1.0, 2.0), size: Vec2::new(3.0, 4.0), repeat: (2, 3), gap: Vec2::new(0.5, 0.5) };
        stream.draw_image(ImageId(7), 1.0, &shape);
        stream.draw_text(MaterialId(0), 1.0, 2, Vec2::new(9.0, 8.0), 14.0, TextAlign::Center);

        let commands: Vec<_> = stream.commands().collect();
        assert!(commands.contains(&RenderCommand::DrawImage { image: ImageId(7), shape }));
        assert!(commands.contains(&RenderCommand::DrawText {
            text_id: 2,
            position: Vec2::new(9.0, 8.0),
            font_size: 14.0,
            align: TextAlign::Center,
        }));
        assert!(stream.byte_len() > 0);
    }

    #[test]
    fn test_large_ids_survive_the_operand_buffer() {
        let mut stream = RenderCommandStream::new();
        let big = (1 << 24) + 1;
        let shape = ShapeDraw { position: Vec2::zeros(), size: Vec2::new(1.0, 1.0), repeat: (big, 1), gap: Vec2::zeros() };
        stream.draw_rect(MaterialId(big), 1.0, &shape);
        stream.draw_image(ImageId(big + 1), 1.0, &shape);
        stream.draw_text(MaterialId(big), 1.0, big + 2, Vec2::zeros(), 10.0, TextAlign::Left);

        let commands: Vec<_> = stream.commands().collect();
        assert!(commands.contains(&RenderCommand::SetMaterial(MaterialId(big))));
        assert!(commands.contains(&RenderCommand::DrawRect(shape)));
        assert!(commands.contains(&RenderCommand::DrawImage { image: ImageId(big + 1), shape }));
        assert!(commands
            .iter()
            .any(|command| matches!(command, RenderCommand::DrawText { text_id, .. } if *text_id == big + 2)));
    }

    #[test]
    fn test_tiles_layout() {
        let shape = ShapeDraw { position: Vec2::zeros(), size: Vec2::new(10.0, 10.0), repeat: (2, 2), gap: Vec2::new(1.0, 2.0) };
        let tiles: Vec<_> = shape.tiles().collect();
        assert_eq!(tiles, vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(11.0, 0.0),
            Vec2::new(0.0, 12.0),
            Vec2::new(11.0, 12.0),
        ]);
    }

    #[test]
    fn test_clear_resets_dedup_state() {
        let mut stream = RenderCommandStream::new();
        stream.draw_rect(MaterialId(0), 1.0, &unit_rect());
        stream.clear();
        stream.draw_rect(MaterialId(0), 1.0, &unit_rect());
        assert_eq!(stream.count(Opcode::SetMaterial), 1);
        assert_eq!(stream.len(), 3);
    }
}
