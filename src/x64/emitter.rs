//! Byte-exact x86-64 instruction encoding.
//!
//! The [`Emitter`] is an append-only buffer exposing one method per
//! supported instruction form; each method appends the exact encoding and
//! nothing else. It knows nothing about the source language: the code
//! generator decides what to emit, the emitter only knows how.
//!
//! Register enums carry the hardware encoding as their discriminant. RSP and
//! RBP (and their subregisters) are deliberately absent: with them excluded,
//! a mod=00 ModRM byte is always a plain `[reg]` memory operand and never a
//! SIB or RIP-relative escape, so the two memory forms below stay two bytes.
//!
//! Displacement semantics for the rel32 jumps: the 4-byte signed immediate
//! is relative to the address immediately following the full jump encoding
//! (opcode plus displacement bytes). Backpatch arithmetic must account for
//! that end-of-instruction convention; [`Emitter::patch_imm32`] is the hook
//! for rewriting a placeholder displacement once the target is known.

/// 8-bit general-purpose registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Reg8 {
    Al = 0b000,
    Cl = 0b001,
    Bl = 0b011,
}

/// 32-bit general-purpose registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Reg32 {
    Eax = 0b000,
    Ecx = 0b001,
    Edx = 0b010,
    Ebx = 0b011,
    Esi = 0b110,
    Edi = 0b111,
}

/// 64-bit general-purpose registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Reg64 {
    Rax = 0b000,
    Rcx = 0b001,
    Rdx = 0b010,
    Rbx = 0b011,
    Rsi = 0b110,
    Rdi = 0b111,
}

/// REX prefix selecting 64-bit operand size.
const REX_W: u8 = 0x48;

/// ModRM with mod=11: register-direct `rm`, with `reg` either a register
/// number or an opcode extension.
fn modrm_reg(reg: u8, rm: u8) -> u8 {
    0xC0 | (reg << 3) | rm
}

/// ModRM with mod=00: `[rm]` memory operand.
fn modrm_mem(reg: u8, rm: u8) -> u8 {
    (reg << 3) | rm
}

/// Append-only instruction-encoding buffer.
#[derive(Debug, Default)]
pub struct Emitter {
    buffer: Vec<u8>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bytes appended so far.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Overwrite 4 previously emitted bytes at `at` with `value`, little
    /// endian. This is the backpatch hook for placeholder rel32
    /// displacements.
    ///
    /// # Panics
    ///
    /// Panics if `at + 4` exceeds the emitted length.
    pub fn patch_imm32(&mut self, at: usize, value: i32) {
        self.buffer[at..at + 4].copy_from_slice(&value.to_le_bytes());
    }

    /// `mov r32, imm32`
    pub fn mov_r32_imm32(&mut self, dst: Reg32, imm: u32) {
        self.buffer.push(0xB8 | dst as u8);
        self.buffer.extend_from_slice(&imm.to_le_bytes());
    }

    /// `mov r64, imm64`
    pub fn mov_r64_imm64(&mut self, dst: Reg64, imm: u64) {
        self.buffer.push(REX_W);
        self.buffer.push(0xB8 | dst as u8);
        self.buffer.extend_from_slice(&imm.to_le_bytes());
    }

    /// `mov r64, r64`
    pub fn mov_r64_r64(&mut self, dst: Reg64, src: Reg64) {
        self.buffer.push(REX_W);
        self.buffer.push(0x89);
        self.buffer.push(modrm_reg(src as u8, dst as u8));
    }

    /// `mov r8, [r64]`: load the byte at the address held in `addr`.
    pub fn load_byte(&mut self, dst: Reg8, addr: Reg64) {
        self.buffer.push(0x8A);
        self.buffer.push(modrm_mem(dst as u8, addr as u8));
    }

    /// `mov [r64], r8`: store `src`'s low byte to the address held in
    /// `addr`.
    pub fn store_byte(&mut self, addr: Reg64, src: Reg8) {
        self.buffer.push(0x88);
        self.buffer.push(modrm_mem(src as u8, addr as u8));
    }

    /// `add al, imm8`
    pub fn add_al_imm8(&mut self, imm: u8) {
        self.buffer.push(0x04);
        self.buffer.push(imm);
    }

    /// `sub al, imm8`
    pub fn sub_al_imm8(&mut self, imm: u8) {
        self.buffer.push(0x2C);
        self.buffer.push(imm);
    }

    /// `add r32, imm32`
    pub fn add_r32_imm32(&mut self, dst: Reg32, imm: u32) {
        self.buffer.push(0x81);
        self.buffer.push(modrm_reg(0, dst as u8));
        self.buffer.extend_from_slice(&imm.to_le_bytes());
    }

    /// `sub r32, imm32`
    pub fn sub_r32_imm32(&mut self, dst: Reg32, imm: u32) {
        self.buffer.push(0x81);
        self.buffer.push(modrm_reg(5, dst as u8));
        self.buffer.extend_from_slice(&imm.to_le_bytes());
    }

    /// `add r64, imm32` (sign-extended)
    pub fn add_r64_imm32(&mut self, dst: Reg64, imm: u32) {
        self.buffer.push(REX_W);
        self.buffer.push(0x81);
        self.buffer.push(modrm_reg(0, dst as u8));
        self.buffer.extend_from_slice(&imm.to_le_bytes());
    }

    /// `sub r64, imm32` (sign-extended)
    pub fn sub_r64_imm32(&mut self, dst: Reg64, imm: u32) {
        self.buffer.push(REX_W);
        self.buffer.push(0x81);
        self.buffer.push(modrm_reg(5, dst as u8));
        self.buffer.extend_from_slice(&imm.to_le_bytes());
    }

    /// `add r32, r32`
    pub fn add_r32_r32(&mut self, dst: Reg32, src: Reg32) {
        self.buffer.push(0x01);
        self.buffer.push(modrm_reg(src as u8, dst as u8));
    }

    /// `sub r32, r32`
    pub fn sub_r32_r32(&mut self, dst: Reg32, src: Reg32) {
        self.buffer.push(0x29);
        self.buffer.push(modrm_reg(src as u8, dst as u8));
    }

    /// `add r64, r64`
    pub fn add_r64_r64(&mut self, dst: Reg64, src: Reg64) {
        self.buffer.push(REX_W);
        self.buffer.push(0x01);
        self.buffer.push(modrm_reg(src as u8, dst as u8));
    }

    /// `sub r64, r64`
    pub fn sub_r64_r64(&mut self, dst: Reg64, src: Reg64) {
        self.buffer.push(REX_W);
        self.buffer.push(0x29);
        self.buffer.push(modrm_reg(src as u8, dst as u8));
    }

    /// `cmp al, imm8`
    pub fn cmp_al_imm8(&mut self, imm: u8) {
        self.buffer.push(0x3C);
        self.buffer.push(imm);
    }

    /// `cmp eax, imm32`
    pub fn cmp_eax_imm32(&mut self, imm: u32) {
        self.buffer.push(0x3D);
        self.buffer.extend_from_slice(&imm.to_le_bytes());
    }

    /// `jmp rel32`
    pub fn jmp_rel32(&mut self, disp: i32) {
        self.buffer.push(0xE9);
        self.buffer.extend_from_slice(&disp.to_le_bytes());
    }

    /// `jz rel32`
    pub fn jz_rel32(&mut self, disp: i32) {
        self.buffer.push(0x0F);
        self.buffer.push(0x84);
        self.buffer.extend_from_slice(&disp.to_le_bytes());
    }

    /// `jnz rel32`
    pub fn jnz_rel32(&mut self, disp: i32) {
        self.buffer.push(0x0F);
        self.buffer.push(0x85);
        self.buffer.extend_from_slice(&disp.to_le_bytes());
    }

    /// `syscall`
    pub fn syscall(&mut self) {
        self.buffer.push(0x0F);
        self.buffer.push(0x05);
    }

    /// `ret`
    pub fn ret(&mut self) {
        self.buffer.push(0xC3);
    }
}
