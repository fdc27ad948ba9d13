//! Decoding of the densely packed 16-bit instruction word.

use crate::numbers;
use std::fmt::{Debug, Formatter};

/// The 16 opcode values carried in bits 15..12, in their ISA order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Opcode {
    Br,
    Add,
    Ld,
    St,
    Jsr,
    And,
    Ldr,
    Str,
    Rti,
    Not,
    Ldi,
    Sti,
    Jmp,
    Res,
    Lea,
    Trap,
}

/// Wrapper for one LC-3 u16 instruction word.
///
/// The operand layout varies by opcode; the accessors below extract the
/// canonical fields and each opcode handler calls only the ones that exist
/// in its encoding.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Instruction(u16);

impl Instruction {
    /// Gives the value of only the specified bit range.
    ///
    /// # Parameters
    /// - `from`: starting index
    /// - `to`: end index (inclusive), must be greater or equal to `from`
    ///
    /// # Panics
    /// - asserts that to is greater or equal from and both are valid indexes
    #[must_use]
    pub fn get_bit_range(self, from: u8, to: u8) -> u16 {
        debug_assert!(
            to >= from,
            "wrong direction of from: {from:?} and to: {to:?}"
        );
        debug_assert!(
            (00..u16::BITS).contains(&u32::from(to)),
            "index: {to:?} to u16 is greater than maximum value {:?}",
            u16::BITS - 1
        );
        (self.0 >> from) & ((0b1 << (to - from + 1)) - 1)
    }
    /// Gives the value of only the specified bit range and converts that to u8.
    /// See [`Instruction::get_bit_range()`]
    /// # Panics
    /// - value does not fit into u8 with message from `expect`
    #[must_use]
    pub fn get_bit_range_u8(self, from: u8, to: u8, expect: &str) -> u8 {
        u8::try_from(self.get_bit_range(from, to)).expect(expect)
    }
    #[must_use]
    pub fn get_bit(self, index: u8) -> bool {
        self.get_bit_range(index, index) & 1 != 0
    }
    #[must_use]
    pub fn opcode(self) -> Opcode {
        match self.get_bit_range(12, 15) {
            0b0000 => Opcode::Br,
            0b0001 => Opcode::Add,
            0b0010 => Opcode::Ld,
            0b0011 => Opcode::St,
            0b0100 => Opcode::Jsr,
            0b0101 => Opcode::And,
            0b0110 => Opcode::Ldr,
            0b0111 => Opcode::Str,
            0b1000 => Opcode::Rti,
            0b1001 => Opcode::Not,
            0b1010 => Opcode::Ldi,
            0b1011 => Opcode::Sti,
            0b1100 => Opcode::Jmp,
            0b1101 => Opcode::Res,
            0b1110 => Opcode::Lea,
            0b1111 => Opcode::Trap,
            _ => unreachable!("the opcode field is four bits"),
        }
    }
    /// Destination register, bits 11..9.
    #[must_use]
    pub fn dr_number(self) -> u8 {
        self.get_bit_range_u8(9, 11, "Error parsing dr")
    }
    /// Source register of the store opcodes; shares the DR field.
    #[must_use]
    pub fn sr_number(self) -> u8 {
        self.dr_number()
    }
    /// First source register, bits 8..6.
    #[must_use]
    pub fn sr1_number(self) -> u8 {
        self.get_bit_range_u8(6, 8, "Error parsing sr1")
    }
    /// Second source register, bits 2..0.
    #[must_use]
    pub fn sr2_number(self) -> u8 {
        self.get_bit_range_u8(0, 2, "Error parsing sr2")
    }
    /// Base register of JMP, JSRR, LDR and STR; shares the SR1 field.
    #[must_use]
    pub fn base_r_number(self) -> u8 {
        self.sr1_number()
    }
    #[must_use]
    pub fn is_immediate(self) -> bool {
        self.get_bit(5)
    }
    /// The sign-extended imm5 field of ADD and AND.
    #[must_use]
    pub fn get_immediate(self) -> u16 {
        numbers::sign_extend(self.get_bit_range(0, 4), 5)
    }
    /// A signed offset field of the given width starting at bit 0.
    ///
    /// Width 9 for the PC-relative opcodes, 11 for JSR, 6 for the
    /// base+offset opcodes.
    #[must_use]
    pub fn signed_offset(self, width: u8) -> i16 {
        numbers::twos_complement_to_decimal(numbers::sign_extend(
            self.get_bit_range(0, width - 1),
            width,
        ))
    }
    /// The nzp field of BR, bits 11..9, in condition-mask form.
    #[must_use]
    pub fn condition_bits(self) -> u16 {
        self.get_bit_range(9, 11)
    }
    /// The trap vector, bits 7..0.
    #[must_use]
    pub fn trap_vector(self) -> u8 {
        self.get_bit_range_u8(0, 7, "Error parsing trap vector")
    }
}

impl Debug for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} ({:#06X} {:#018b})", self.opcode(), self.0, self.0)
    }
}

impl From<u16> for Instruction {
    fn from(bits: u16) -> Self {
        Self(bits)
    }
}
