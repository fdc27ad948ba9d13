//! Implemented operations for the LC-3.
//!
//! One handler per opcode. Handlers read all their operands before writing
//! anything, so instructions that name the same register on both sides use
//! the old value.
use crate::emulator::instruction::Instruction;
use crate::hardware::memory::Memory;
use crate::hardware::registers::{Register, Registers, from_binary};

/// Address arithmetic is 16-bit and wraps, both for PC-relative and for
/// base+offset forms.
fn address_by_offset(base: Register, offset: i16) -> u16 {
    base.as_binary().wrapping_add_signed(offset)
}

/// ADD: Mathematical addition in 2 variants
/// - DR is set with result of SR 1 + SR 2
/// ```text
///  15__12__11_9__8_6___5___4_3__2_0_
/// | 0001 |  DR | SR1 | 0 | 00 | SR2 |
///  ---------------------------------
/// ```
/// - DR is set with result of SR 1 + sign extended immediate
/// ```text
///  15__12__11_9__8_6___5___4___0_
/// | 0001 |  DR | SR1 | 1 |  IMM5 |
///  ------------------------------
/// ```
#[expect(
    clippy::cast_possible_truncation,
    reason = "LC-3 addition is modulo 2^16"
)]
pub fn add(i: Instruction, r: &mut Registers) {
    let lhs = r.get(i.sr1_number()).as_binary_u32();
    let rhs = if i.is_immediate() {
        u32::from(i.get_immediate())
    } else {
        r.get(i.sr2_number()).as_binary_u32()
    };
    r.set(i.dr_number(), from_binary((lhs + rhs) as u16));
    r.update_conditional_register(i.dr_number());
}

/// AND: bit-wise AND in 2 variants
/// - DR is set with result of SR 1 AND SR 2
/// ```text
///  15__12__11_9__8_6___5___4_3__2_0_
/// | 0101 |  DR | SR1 | 0 | 00 | SR2 |
///  ---------------------------------
/// ```
/// - DR is set with result of SR 1 AND sign extended immediate
/// ```text
///  15__12__11_9__8_6___5___4___0_
/// | 0101 |  DR | SR1 | 1 |  IMM5 |
///  ------------------------------
/// ```
pub fn and(i: Instruction, r: &mut Registers) {
    let rhs = if i.is_immediate() {
        i.get_immediate()
    } else {
        r.get(i.sr2_number()).as_binary()
    };
    r.set(
        i.dr_number(),
        from_binary(r.get(i.sr1_number()).as_binary() & rhs),
    );
    r.update_conditional_register(i.dr_number());
}

/// NOT: bit-wise complement of the value in SR 1
/// ```text
///  15__12__11_9__8_6___5___0_
/// | 1001 |  DR | SR1 | 11111 |
///  --------------------------
/// ```
pub fn not(i: Instruction, r: &mut Registers) {
    r.set(
        i.dr_number(),
        from_binary(!r.get(i.sr1_number()).as_binary()),
    );
    r.update_conditional_register(i.dr_number());
}

/// BR: Conditional Branch
/// Adds the sign extended offset to PC when the current condition flag
/// matches a set bit of `n`, `z` or `p`. An all-zero nzp never branches;
/// an all-one nzp always does.
/// ```text
///  15__12__11_9___8_______0_
/// | 0000 |  nzp | PCoffset9 |
///  -------------------------
/// ```
/// See [`crate::hardware::registers::ConditionFlag`]
pub fn br(i: Instruction, r: &mut Registers) {
    if i.condition_bits() & r.get_conditional_register().as_mask() != 0 {
        r.set_pc(address_by_offset(r.pc(), i.signed_offset(9)));
    }
}

/// JMP: Set PC to the value of the base register. RET is the assembler
/// spelling with base register 7.
/// ```text
///  15__12__11_9__8___6____5____0_
/// | 1100 |  000 | BaseR | 000000 |
///  ------------------------------
/// ```
pub fn jmp(i: Instruction, r: &mut Registers) {
    r.set_pc(r.get(i.base_r_number()).as_binary());
}

/// JSR / JSRR: Jump to subroutine, saving the return address in R7.
/// The save happens before the target is computed, so JSR adds its offset
/// to the saved PC and a self-referential `JSRR R7` jumps to the return
/// address.
/// ```text
///  15__12__11______________0_      15__12__11_10_9__8___6____5____0_
/// | 0100 | 1 |  PCoffset11  |  or | 0100 | 0 | 00 | BaseR | 000000 |
///  --------------------------      ---------------------------------
/// ```
pub fn jsr(i: Instruction, r: &mut Registers) {
    let return_address = r.pc();
    r.set(7, return_address);
    if i.get_bit(11) {
        r.set_pc(address_by_offset(return_address, i.signed_offset(11)));
    } else {
        r.set_pc(r.get(i.base_r_number()).as_binary());
    }
}

/// LD: Loads content of memory address of PC + sign extended offset into DR.
/// ```text
///  15__12__11_9___8_______0_
/// | 0010 |  DR  | PCoffset9 |
///  -------------------------
/// ```
pub fn ld(i: Instruction, r: &mut Registers, memory: &mut Memory) {
    let value = memory.read(address_by_offset(r.pc(), i.signed_offset(9)));
    r.set(i.dr_number(), from_binary(value));
    r.update_conditional_register(i.dr_number());
}

/// LDI: Load indirect.
/// Calculates memory address of PC + sign extended offset and reads another
/// address from there, the content of the memory at that indirectly loaded
/// address is put into DR.
/// ```text
///  15__12__11_9___8_______0_
/// | 1010 |  DR  | PCoffset9 |
///  -------------------------
/// ```
pub fn ldi(i: Instruction, r: &mut Registers, memory: &mut Memory) {
    let address_address = address_by_offset(r.pc(), i.signed_offset(9));
    let value_address = memory.read(address_address);
    let value = memory.read(value_address);
    r.set(i.dr_number(), from_binary(value));
    r.update_conditional_register(i.dr_number());
}

/// LDR: Load address from base register and adds sign extended offset to
/// load the memory content from there into DR.
/// ```text
///  15__12__11_9__8___6____5____0_
/// | 0110 |  DR | BaseR | offset6 |
///  ------------------------------
/// ```
pub fn ldr(i: Instruction, r: &mut Registers, memory: &mut Memory) {
    let value_address = address_by_offset(r.get(i.base_r_number()), i.signed_offset(6));
    let value = memory.read(value_address);
    r.set(i.dr_number(), from_binary(value));
    r.update_conditional_register(i.dr_number());
}

/// LEA: Load Effective Address loads PC + sign extended offset into DR.
/// The address itself is the result; memory is not touched.
/// ```text
///  15__12__11_9___8_______0_
/// | 1110 |  DR  | PCoffset9 |
///  -------------------------
/// ```
pub fn lea(i: Instruction, r: &mut Registers) {
    r.set(
        i.dr_number(),
        from_binary(address_by_offset(r.pc(), i.signed_offset(9))),
    );
    r.update_conditional_register(i.dr_number());
}

/// ST: Store. The contents of the SR are written to memory address PC +
/// sign extended offset. Stores never update the condition flags.
/// ```text
///  15__12__11_9___8_______0_
/// | 0011 |  SR  | PCoffset9 |
///  -------------------------
/// ```
pub fn st(i: Instruction, r: &Registers, memory: &mut Memory) {
    memory.write(
        address_by_offset(r.pc(), i.signed_offset(9)),
        r.get(i.sr_number()).as_binary(),
    );
}

/// STI: Store Indirect. The contents of the SR are written to the address
/// which is loaded from memory address PC + sign extended offset.
/// ```text
///  15__12__11_9___8_______0_
/// | 1011 |  SR  | PCoffset9 |
///  -------------------------
/// ```
pub fn sti(i: Instruction, r: &Registers, memory: &mut Memory) {
    let target = memory.read(address_by_offset(r.pc(), i.signed_offset(9)));
    memory.write(target, r.get(i.sr_number()).as_binary());
}

/// STR: Store contents of SR to memory address of base register plus sign
/// extended offset.
/// ```text
///  15__12__11_9__8___6____5____0_
/// | 0111 |  SR | BaseR | offset6 |
///  ------------------------------
/// ```
pub fn str(i: Instruction, r: &Registers, memory: &mut Memory) {
    memory.write(
        address_by_offset(r.get(i.base_r_number()), i.signed_offset(6)),
        r.get(i.sr_number()).as_binary(),
    );
}

#[expect(clippy::unusual_byte_groupings)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::registers::{ConditionFlag, from_decimal};
    use googletest::prelude::*;

    #[gtest]
    pub fn test_opcode_add() {
        let mut regs = Registers::new();
        regs.set(0, from_binary(22));
        regs.set(1, from_binary(128));
        // Add: DR: 2, SR1: 0: 22, Immediate: false, SR2: 1: 128 => R2: 150
        add(0b0001_010_000_0_00_001.into(), &mut regs);
        // Add: DR: 3, SR1: 2: 150, Immediate: true, imm5: 14 => R3: 164
        add(0b0001_011_010_1_01110.into(), &mut regs);
        expect_that!(regs.get(0), eq(from_binary(22)));
        expect_that!(regs.get(1), eq(from_binary(128)));
        expect_that!(regs.get(2), eq(from_binary(150)));
        expect_that!(regs.get(3), eq(from_binary(164)));
        expect_that!(regs.get_conditional_register(), eq(ConditionFlag::Pos));
    }

    #[gtest]
    pub fn test_opcode_add_negative_immediate() {
        let mut regs = Registers::new();
        // Add: DR: 1, SR1: 1: 0, Immediate: true, imm5: -1 => R1: -1
        add(0b0001_001_001_1_11111.into(), &mut regs);
        expect_that!(regs.get(1), eq(from_binary(0xFFFF)));
        expect_that!(regs.get_conditional_register(), eq(ConditionFlag::Neg));
    }

    #[gtest]
    pub fn test_opcode_add_wraps_into_negative() {
        let mut regs = Registers::new();
        regs.set(0, from_binary(0x7FFF)); // largest positive number in 2's complement
        regs.set(1, from_binary(1));
        // Add: DR: 2, SR1: 0, Immediate: false, SR2: 1 => R2: 0x8000
        add(0b0001_010_000_0_00_001.into(), &mut regs);
        expect_that!(regs.get(2), eq(from_binary(0x8000)));
        expect_that!(regs.get_conditional_register(), eq(ConditionFlag::Neg));
    }

    #[gtest]
    pub fn test_opcode_add_result_0() {
        let mut regs = Registers::new();
        regs.set(0, from_binary(0x7FFF));
        regs.set(1, from_binary(!0x7FFF + 1));
        regs.set(2, from_binary(1)); // to be sure opcode was executed
        // Add: DR: 2, SR1: 0, Immediate: false, SR2: 1 => R2: 0
        add(0b0001_010_000_0_00_001.into(), &mut regs);
        expect_that!(regs.get(2), eq(from_binary(0)));
        expect_that!(regs.get_conditional_register(), eq(ConditionFlag::Zero));
    }

    #[gtest]
    pub fn test_opcode_add_same_register_on_both_sides() {
        let mut regs = Registers::new();
        regs.set(1, from_binary(5));
        // Add: DR: 1, SR1: 1, Immediate: false, SR2: 1 => R1: 10
        add(0b0001_001_001_0_00_001.into(), &mut regs);
        expect_that!(regs.get(1), eq(from_binary(10)));
    }

    #[gtest]
    pub fn test_opcode_and() {
        let mut regs = Registers::new();
        regs.set(0, from_binary(0b1101_1001_0111_0101));
        regs.set(1, from_binary(0b0100_1010_0010_1001));
        // And: DR: 2, SR1: 0, Immediate: false, SR2: 1
        and(0b0101_010_000_0_00_001.into(), &mut regs);
        expect_that!(regs.get(2), eq(from_binary(0b0100_1000_0010_0001)));
        expect_that!(regs.get_conditional_register(), eq(ConditionFlag::Pos));
    }

    #[gtest]
    pub fn test_opcode_and_immediate() {
        let mut regs = Registers::new();
        regs.set(0, from_binary(0b1101_1001_0111_0101));
        // And: DR: 2, SR1: 0, Immediate: true, imm5: -11 sign extends to 0xFFF5
        and(0b0101_010_000_1_10101.into(), &mut regs);
        expect_that!(regs.get(2), eq(from_binary(0b1101_1001_0111_0101)));
        expect_that!(regs.get_conditional_register(), eq(ConditionFlag::Neg));
    }

    #[gtest]
    pub fn test_opcode_and_immediate_zero_clears() {
        let mut regs = Registers::new();
        regs.set(4, from_binary(0xBEEF));
        // And: DR: 4, SR1: 4, Immediate: true, imm5: 0 => R4: 0, flag Zero
        and(0b0101_100_100_1_00000.into(), &mut regs);
        expect_that!(regs.get(4), eq(from_binary(0)));
        expect_that!(regs.get_conditional_register(), eq(ConditionFlag::Zero));
    }

    #[gtest]
    pub fn test_opcode_not() {
        let mut regs = Registers::new();
        regs.set(0, from_binary(0x7FFF));
        // Not: DR: 1, SR1: 0 => R1: 0x8000
        super::not(0b1001_001_000_111111.into(), &mut regs);
        expect_that!(regs.get(1), eq(from_binary(0x8000)));
        expect_that!(regs.get_conditional_register(), eq(ConditionFlag::Neg));
        // Not: DR: 0, SR1: 1 restores the original value
        super::not(0b1001_000_001_111111.into(), &mut regs);
        expect_that!(regs.get(0), eq(from_binary(0x7FFF)));
        expect_that!(regs.get_conditional_register(), eq(ConditionFlag::Pos));
    }

    #[gtest]
    pub fn test_opcode_br_taken_when_flag_matches() {
        let mut regs = Registers::new();
        regs.set_pc(0x3001);
        regs.set(0, from_binary(1));
        regs.update_conditional_register(0); // Pos
        // Br: p, PCoffset9: 2
        br(0b0000_001_000000010.into(), &mut regs);
        expect_that!(regs.pc(), eq(from_binary(0x3003)));
    }

    #[gtest]
    pub fn test_opcode_br_not_taken_when_flag_differs() {
        let mut regs = Registers::new();
        regs.set_pc(0x3001);
        regs.set(0, from_binary(1));
        regs.update_conditional_register(0); // Pos
        // Br: n, PCoffset9: 2
        br(0b0000_100_000000010.into(), &mut regs);
        expect_that!(regs.pc(), eq(from_binary(0x3001)));
    }

    #[gtest]
    pub fn test_opcode_br_all_zero_nzp_is_a_no_op() {
        let mut regs = Registers::new();
        regs.set_pc(0x3001);
        br(0b0000_000_000000010.into(), &mut regs);
        expect_that!(regs.pc(), eq(from_binary(0x3001)));
    }

    #[gtest]
    pub fn test_opcode_br_unconditional_with_negative_offset() {
        let mut regs = Registers::new();
        regs.set_pc(0x3005);
        // Br: nzp, PCoffset9: -3
        br(0b0000_111_111111101.into(), &mut regs);
        expect_that!(regs.pc(), eq(from_binary(0x3002)));
    }

    #[gtest]
    pub fn test_opcode_jmp_and_ret_form() {
        let mut regs = Registers::new();
        regs.set(3, from_binary(0x4123));
        // Jmp: BaseR: 3
        jmp(0b1100_000_011_000000.into(), &mut regs);
        expect_that!(regs.pc(), eq(from_binary(0x4123)));

        regs.set(7, from_binary(0x3001));
        // Ret is Jmp with BaseR: 7
        jmp(0b1100_000_111_000000.into(), &mut regs);
        expect_that!(regs.pc(), eq(from_binary(0x3001)));
    }

    #[gtest]
    pub fn test_opcode_jsr_adds_offset_to_saved_pc() {
        let mut regs = Registers::new();
        regs.set_pc(0x3001);
        // Jsr: PCoffset11: 2
        jsr(0b0100_1_00000000010.into(), &mut regs);
        expect_that!(regs.get(7), eq(from_binary(0x3001)));
        expect_that!(regs.pc(), eq(from_binary(0x3003)));
    }

    #[gtest]
    pub fn test_opcode_jsrr_jumps_to_base_register() {
        let mut regs = Registers::new();
        regs.set_pc(0x3001);
        regs.set(2, from_binary(0x5000));
        // Jsrr: BaseR: 2; bits 10..9 are ignored
        jsr(0b0100_0_11_010_000000.into(), &mut regs);
        expect_that!(regs.get(7), eq(from_binary(0x3001)));
        expect_that!(regs.pc(), eq(from_binary(0x5000)));
    }

    #[gtest]
    pub fn test_opcode_jsrr_with_base_r7_uses_the_saved_pc() {
        let mut regs = Registers::new();
        regs.set_pc(0x3001);
        regs.set(7, from_binary(0x5000));
        // Jsrr: BaseR: 7; R7 is written before the target is read
        jsr(0b0100_0_00_111_000000.into(), &mut regs);
        expect_that!(regs.get(7), eq(from_binary(0x3001)));
        expect_that!(regs.pc(), eq(from_binary(0x3001)));
    }

    #[gtest]
    pub fn test_opcode_ld() {
        let mut regs = Registers::new();
        regs.set_pc(0x3002);
        let memory = &mut Memory::with_words(0x3000, &[4711, 815]);
        // Ld: DR: 4, PCoffset9: -2
        ld(0b0010_100_111111110.into(), &mut regs, memory);
        expect_that!(regs.get(4), eq(from_decimal(4711)));
        expect_that!(regs.get_conditional_register(), eq(ConditionFlag::Pos));

        // Ld: DR: 4, PCoffset9: -1
        ld(0b0010_100_111111111.into(), &mut regs, memory);
        expect_that!(regs.get(4), eq(from_decimal(815)));
    }

    #[gtest]
    pub fn test_opcode_ldi() {
        let mut regs = Registers::new();
        regs.set_pc(0x3001);
        let memory = &mut Memory::with_words(0x3000, &[0, 0, 0x4000]);
        let mem_val = 0b1111_1111_1111_0110; // -10
        memory.write(0x4000, mem_val);
        // Ldi: DR: 1, PCoffset9: 1 => pointer at 0x3002, value at 0x4000
        ldi(0b1010_001_000000001.into(), &mut regs, memory);
        expect_that!(regs.get(1), eq(from_binary(mem_val)));
        expect_that!(regs.get_conditional_register(), eq(ConditionFlag::Neg));
    }

    #[gtest]
    pub fn test_opcode_ldr() {
        let mut regs = Registers::new();
        let memory = &mut Memory::with_words(0x3000, &[0, 0, 0, 0, 0, 0x00FF]);
        regs.set(6, from_binary(0x3025));
        // Ldr: DR: 2, BaseR: 6, offset6: -32
        ldr(0b0110_010_110_100000.into(), &mut regs, memory);
        expect_that!(regs.get(2), eq(from_binary(0x00FF)));
        expect_that!(regs.get_conditional_register(), eq(ConditionFlag::Pos));
    }

    #[gtest]
    pub fn test_opcode_lea() {
        let mut regs = Registers::new();
        regs.set_pc(0x3045);
        // Lea: DR: 3, PCoffset9: 0x55
        lea(0b1110_011_0_0101_0101.into(), &mut regs);
        expect_that!(regs.get(3), eq(from_binary(0x3045 + 0x55)));
        expect_that!(regs.get_conditional_register(), eq(ConditionFlag::Pos));
    }

    #[gtest]
    pub fn test_opcode_lea_zero_offset_yields_pc() {
        let mut regs = Registers::new();
        regs.set_pc(0x3001);
        // Lea: DR: 0, PCoffset9: 0
        lea(0b1110_000_000000000.into(), &mut regs);
        expect_that!(regs.get(0), eq(from_binary(0x3001)));
    }

    #[gtest]
    pub fn test_opcode_st_does_not_touch_flags() {
        let mut regs = Registers::new();
        regs.set_pc(0x3001);
        regs.set(5, from_decimal(-1));
        let memory = &mut Memory::with_words(0x3000, &[]);
        let flag_before = regs.get_conditional_register();
        // St: SR: 5, PCoffset9: 4
        st(0b0011_101_000000100.into(), &regs, memory);
        expect_that!(memory.read(0x3005), eq(0xFFFF));
        expect_that!(regs.get_conditional_register(), eq(flag_before));
    }

    #[gtest]
    pub fn test_opcode_sti() {
        let mut regs = Registers::new();
        regs.set_pc(0x3001);
        regs.set(0, from_binary(0x1234));
        let memory = &mut Memory::with_words(0x3000, &[0, 0, 0x5000]);
        // Sti: SR: 0, PCoffset9: 1 => pointer at 0x3002, target 0x5000
        sti(0b1011_000_000000001.into(), &regs, memory);
        expect_that!(memory.read(0x5000), eq(0x1234));
    }

    #[gtest]
    pub fn test_opcode_str_with_negative_offset() {
        let mut regs = Registers::new();
        regs.set(1, from_binary(0xCAFE));
        regs.set(2, from_binary(0x3020));
        let memory = &mut Memory::with_words(0x3000, &[]);
        // Str: SR: 1, BaseR: 2, offset6: -32
        str(0b0111_001_010_100000.into(), &regs, memory);
        expect_that!(memory.read(0x3000), eq(0xCAFE));
    }

    #[gtest]
    pub fn test_opcode_str_uses_the_full_offset_field() {
        let mut regs = Registers::new();
        regs.set(1, from_binary(0xBEEF));
        regs.set(2, from_binary(0x3000));
        let memory = &mut Memory::with_words(0x3000, &[]);
        // Str: SR: 1, BaseR: 2, offset6: 31; every offset bit must count
        str(0b0111_001_010_011111.into(), &regs, memory);
        expect_that!(memory.read(0x301F), eq(0xBEEF));
    }

    #[gtest]
    pub fn test_address_arithmetic_wraps() {
        let mut regs = Registers::new();
        regs.set_pc(0xFFFF);
        // Lea: DR: 0, PCoffset9: 4 wraps past the top of memory
        lea(0b1110_000_000000100.into(), &mut regs);
        expect_that!(regs.get(0), eq(from_binary(0x0003)));
    }
}
