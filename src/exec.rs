use crate::cpu::{Cpu, Trap};
use crate::decoder::{Decoded, Dest};
use crate::memory::Bus;

pub trait Executor {
    fn exec<B: Bus>(&self, cpu: &mut Cpu, bus: &mut B, d: Decoded) -> Result<(), Trap>;
}

/// Executes decoded instructions with the Hack ALU.
pub struct AluExecutor;

impl Executor for AluExecutor {
    fn exec<B: Bus>(&self, cpu: &mut Cpu, bus: &mut B, d: Decoded) -> Result<(), Trap> {
        match d {
            Decoded::A(v) => {
                cpu.a = v;
            }
            Decoded::C { comp, dest, jump } => {
                // M and jump target both use A as it was before this instruction
                let addr = cpu.a;
                let y = if comp & 0x40 != 0 {
                    bus.read(addr).map_err(|source| Trap::Bus { addr, source })?
                } else {
                    cpu.a
                };
                let out = alu(cpu.d, y, comp);
                if dest.contains(Dest::M) {
                    bus.write(addr, out).map_err(|source| Trap::Bus { addr, source })?;
                }
                if dest.contains(Dest::A) {
                    cpu.a = out;
                }
                if dest.contains(Dest::D) {
                    cpu.d = out;
                }
                if jump.taken(out as i16) {
                    cpu.pc = addr;
                }
            }
        }
        Ok(())
    }
}

/// Hack ALU over `x = D` and `y = A|M`, driven by `c1..c6 = zx nx zy ny f no`.
pub fn alu(x: u16, y: u16, comp: u8) -> u16 {
    let bit = |n: u8| comp & (1 << n) != 0;
    let mut x = if bit(5) { 0 } else { x };
    if bit(4) {
        x = !x;
    }
    let mut y = if bit(3) { 0 } else { y };
    if bit(2) {
        y = !y;
    }
    let out = if bit(1) { x.wrapping_add(y) } else { x & y };
    if bit(0) {
        !out
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instructions::comp_bits;

    fn run(mnemonic: &str, d: u16, y: u16) -> i16 {
        alu(d, y, comp_bits(mnemonic).unwrap()) as i16
    }

    #[test]
    fn alu_table() {
        let (d, a) = (17u16, 5u16);
        assert_eq!(run("0", d, a), 0);
        assert_eq!(run("1", d, a), 1);
        assert_eq!(run("-1", d, a), -1);
        assert_eq!(run("D", d, a), 17);
        assert_eq!(run("A", d, a), 5);
        assert_eq!(run("M", d, a), 5);
        assert_eq!(run("!D", d, a), !17);
        assert_eq!(run("-A", d, a), -5);
        assert_eq!(run("D+1", d, a), 18);
        assert_eq!(run("A-1", d, a), 4);
        assert_eq!(run("D+A", d, a), 22);
        assert_eq!(run("D-A", d, a), 12);
        assert_eq!(run("A-D", d, a), -12);
        assert_eq!(run("M-D", d, a), -12);
        assert_eq!(run("D&M", 0b1100, 0b1010), 0b1000);
        assert_eq!(run("D|M", 0b1100, 0b1010), 0b1110);
    }

    #[test]
    fn alu_wraps_at_16_bits() {
        assert_eq!(run("D+A", 0x7FFF, 1), i16::MIN);
        assert_eq!(run("-D", 0x8000, 0), i16::MIN);
    }
}
