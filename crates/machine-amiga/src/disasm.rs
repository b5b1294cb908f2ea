//! 68000 disassembler.
//!
//! Decodes one instruction at a time for the debugger's instruction list.
//! Anything that is not a valid 68000 encoding (including line-A and line-F
//! traps) is shown as a `dc.w` data word, so the caller always advances by
//! at least one word.

use emu_core::{InstrInfo, MIN_INSTR_BYTES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Size {
    Byte,
    Word,
    Long,
}

impl Size {
    const fn suffix(self) -> &'static str {
        match self {
            Size::Byte => ".b",
            Size::Word => ".w",
            Size::Long => ".l",
        }
    }

    /// Standard two-bit size field (bits 7-6). `11` is not a size.
    const fn from_bits(bits: u16) -> Option<Self> {
        match bits & 3 {
            0 => Some(Size::Byte),
            1 => Some(Size::Word),
            2 => Some(Size::Long),
            _ => None,
        }
    }
}

const CONDITIONS: [&str; 16] = [
    "t", "f", "hi", "ls", "cc", "cs", "ne", "eq", "vc", "vs", "pl", "mi", "ge", "lt", "gt", "le",
];

/// Disassemble the instruction at `addr`, fetching words through `read_word`.
pub fn disassemble(addr: u32, read_word: impl Fn(u32) -> u16) -> InstrInfo {
    let mut decoder = Decoder {
        read_word,
        addr,
        pc: addr,
        words: Vec::with_capacity(5),
    };
    let opcode = decoder.next_word();

    let text = decoder.decode(opcode);
    let (text, words) = match text {
        Some(text) => (text, decoder.words),
        None => (format!("dc.w    ${opcode:04x}"), vec![opcode]),
    };

    let data = words
        .iter()
        .map(|w| format!("{w:04X}"))
        .collect::<Vec<_>>()
        .join(" ");
    let bytes = (words.len() as u32 * 2).max(MIN_INSTR_BYTES);

    InstrInfo {
        instr: text,
        data,
        bytes,
    }
}

struct Decoder<F> {
    read_word: F,
    addr: u32,
    pc: u32,
    words: Vec<u16>,
}

fn op(mnemonic: &str, operands: &str) -> String {
    if operands.is_empty() {
        mnemonic.to_string()
    } else {
        format!("{mnemonic:<8}{operands}")
    }
}

fn signed_hex(v: i32) -> String {
    if v < 0 {
        format!("-${:x}", v.unsigned_abs())
    } else {
        format!("${v:x}")
    }
}

/// MOVEM register list, e.g. `d0-d3/a5`. Predecrement masks are reversed.
fn register_list(mask: u16, predecrement: bool) -> String {
    let mask = if predecrement { mask.reverse_bits() } else { mask };
    let mut parts = Vec::new();
    for (bank, prefix) in [(0u16, 'd'), (8u16, 'a')] {
        let mut reg = 0;
        while reg < 8 {
            if mask & (1 << (bank + reg)) == 0 {
                reg += 1;
                continue;
            }
            let start = reg;
            while reg < 8 && mask & (1 << (bank + reg)) != 0 {
                reg += 1;
            }
            if reg - start == 1 {
                parts.push(format!("{prefix}{start}"));
            } else {
                parts.push(format!("{prefix}{start}-{prefix}{}", reg - 1));
            }
        }
    }
    parts.join("/")
}

impl<F: Fn(u32) -> u16> Decoder<F> {
    fn next_word(&mut self) -> u16 {
        let w = (self.read_word)(self.pc);
        self.pc = self.pc.wrapping_add(2);
        self.words.push(w);
        w
    }

    fn next_long(&mut self) -> u32 {
        let hi = u32::from(self.next_word());
        let lo = u32::from(self.next_word());
        hi << 16 | lo
    }

    /// Brief extension word: `d8(base,Xn.s)`.
    fn indexed(&mut self, base: &str) -> String {
        let ext = self.next_word();
        let disp = i32::from(ext as u8 as i8);
        let kind = if ext & 0x8000 != 0 { 'a' } else { 'd' };
        let reg = (ext >> 12) & 7;
        let size = if ext & 0x0800 != 0 { 'l' } else { 'w' };
        format!("{}({base},{kind}{reg}.{size})", signed_hex(disp))
    }

    /// Effective address operand. `None` for encodings that do not exist.
    fn ea(&mut self, mode: u16, reg: u16, size: Size) -> Option<String> {
        let text = match (mode & 7, reg & 7) {
            (0, r) => format!("d{r}"),
            (1, r) => format!("a{r}"),
            (2, r) => format!("(a{r})"),
            (3, r) => format!("(a{r})+"),
            (4, r) => format!("-(a{r})"),
            (5, r) => {
                let disp = i32::from(self.next_word() as i16);
                format!("{}(a{r})", signed_hex(disp))
            }
            (6, r) => self.indexed(&format!("a{r}")),
            (7, 0) => format!("${:04x}.w", self.next_word()),
            (7, 1) => format!("${:x}", self.next_long()),
            (7, 2) => {
                let base = self.pc;
                let disp = i32::from(self.next_word() as i16);
                format!("${:x}(pc)", base.wrapping_add(disp as u32) & 0x00FF_FFFF)
            }
            (7, 3) => self.indexed("pc"),
            (7, 4) => match size {
                Size::Byte => format!("#${:02x}", self.next_word() & 0xFF),
                Size::Word => format!("#${:04x}", self.next_word()),
                Size::Long => format!("#${:x}", self.next_long()),
            },
            _ => return None,
        };
        Some(text)
    }

    /// Effective address from the low six bits of the opcode.
    fn ea_low(&mut self, opcode: u16, size: Size) -> Option<String> {
        self.ea((opcode >> 3) & 7, opcode & 7, size)
    }

    fn branch_target(&self, disp: i32) -> u32 {
        self.addr.wrapping_add(2).wrapping_add(disp as u32) & 0x00FF_FFFF
    }

    fn decode(&mut self, opcode: u16) -> Option<String> {
        match opcode >> 12 {
            0x0 => self.decode_immediate(opcode),
            0x1..=0x3 => self.decode_move(opcode),
            0x4 => self.decode_misc(opcode),
            0x5 => self.decode_quick(opcode),
            0x6 => {
                let cond = usize::from((opcode >> 8) & 0xF);
                let mnemonic = match cond {
                    0 => "bra".to_string(),
                    1 => "bsr".to_string(),
                    c => format!("b{}", CONDITIONS[c]),
                };
                let disp8 = opcode as u8;
                let (suffix, disp) = if disp8 == 0 {
                    (".w", i32::from(self.next_word() as i16))
                } else {
                    (".s", i32::from(disp8 as i8))
                };
                let target = self.branch_target(disp);
                Some(op(&format!("{mnemonic}{suffix}"), &format!("${target:x}")))
            }
            0x7 => {
                if opcode & 0x0100 != 0 {
                    return None;
                }
                let data = i32::from(opcode as u8 as i8);
                let reg = (opcode >> 9) & 7;
                Some(op("moveq", &format!("#{},d{reg}", signed_hex(data))))
            }
            0x8 => self.decode_or_div(opcode),
            0x9 => self.decode_arith(opcode, "sub"),
            0xB => self.decode_cmp_eor(opcode),
            0xC => self.decode_and_mul(opcode),
            0xD => self.decode_arith(opcode, "add"),
            0xE => self.decode_shift(opcode),
            // Line-A and line-F emulator traps
            _ => None,
        }
    }

    fn decode_immediate(&mut self, opcode: u16) -> Option<String> {
        let mode = (opcode >> 3) & 7;
        let reg = opcode & 7;

        // Dynamic bit ops and MOVEP
        if opcode & 0x0100 != 0 {
            let dn = (opcode >> 9) & 7;
            if mode == 1 {
                let size = if opcode & 0x0040 != 0 { ".l" } else { ".w" };
                let disp = i32::from(self.next_word() as i16);
                let mem = format!("{}(a{reg})", signed_hex(disp));
                let operands = if opcode & 0x0080 != 0 {
                    format!("d{dn},{mem}")
                } else {
                    format!("{mem},d{dn}")
                };
                return Some(op(&format!("movep{size}"), &operands));
            }
            let mnemonic = ["btst", "bchg", "bclr", "bset"][usize::from((opcode >> 6) & 3)];
            let dst = self.ea(mode, reg, Size::Byte)?;
            return Some(op(mnemonic, &format!("d{dn},{dst}")));
        }

        // Static bit ops
        if opcode & 0x0F00 == 0x0800 {
            let mnemonic = ["btst", "bchg", "bclr", "bset"][usize::from((opcode >> 6) & 3)];
            let bit = self.next_word() & 0xFF;
            let dst = self.ea(mode, reg, Size::Byte)?;
            return Some(op(mnemonic, &format!("#{bit},{dst}")));
        }

        let mnemonic = match (opcode >> 9) & 7 {
            0 => "ori",
            1 => "andi",
            2 => "subi",
            3 => "addi",
            5 => "eori",
            6 => "cmpi",
            _ => return None,
        };

        // To CCR / SR forms exist for the logical ops only
        if matches!(mnemonic, "ori" | "andi" | "eori") {
            match opcode & 0xFF {
                0x3C => {
                    let imm = self.next_word() & 0xFF;
                    return Some(op(mnemonic, &format!("#${imm:02x},ccr")));
                }
                0x7C => {
                    let imm = self.next_word();
                    return Some(op(mnemonic, &format!("#${imm:04x},sr")));
                }
                _ => {}
            }
        }

        let size = Size::from_bits(opcode >> 6)?;
        if mode == 1 || (mode == 7 && reg > 1) {
            return None;
        }
        let src = self.ea(7, 4, size)?;
        let dst = self.ea(mode, reg, size)?;
        Some(op(&format!("{mnemonic}{}", size.suffix()), &format!("{src},{dst}")))
    }

    fn decode_move(&mut self, opcode: u16) -> Option<String> {
        let size = match opcode >> 12 {
            1 => Size::Byte,
            2 => Size::Long,
            _ => Size::Word,
        };
        let dst_mode = (opcode >> 6) & 7;
        let dst_reg = (opcode >> 9) & 7;
        if dst_mode == 7 && dst_reg > 1 {
            return None;
        }
        if dst_mode == 1 && size == Size::Byte {
            return None;
        }

        let src = self.ea_low(opcode, size)?;
        let dst = self.ea(dst_mode, dst_reg, size)?;
        let mnemonic = if dst_mode == 1 { "movea" } else { "move" };
        Some(op(&format!("{mnemonic}{}", size.suffix()), &format!("{src},{dst}")))
    }

    fn decode_misc(&mut self, opcode: u16) -> Option<String> {
        let reg = opcode & 7;
        match opcode {
            0x4AFC => return Some("illegal".to_string()),
            0x4E70 => return Some("reset".to_string()),
            0x4E71 => return Some("nop".to_string()),
            0x4E72 => {
                let imm = self.next_word();
                return Some(op("stop", &format!("#${imm:04x}")));
            }
            0x4E73 => return Some("rte".to_string()),
            0x4E75 => return Some("rts".to_string()),
            0x4E76 => return Some("trapv".to_string()),
            0x4E77 => return Some("rtr".to_string()),
            _ => {}
        }

        match opcode & 0xFFF8 {
            0x4E40 | 0x4E48 => return Some(op("trap", &format!("#{}", opcode & 0xF))),
            0x4E50 => {
                let disp = i32::from(self.next_word() as i16);
                return Some(op("link", &format!("a{reg},#{}", signed_hex(disp))));
            }
            0x4E58 => return Some(op("unlk", &format!("a{reg}"))),
            0x4E60 => return Some(op("move.l", &format!("a{reg},usp"))),
            0x4E68 => return Some(op("move.l", &format!("usp,a{reg}"))),
            0x4840 => return Some(op("swap", &format!("d{reg}"))),
            0x4880 => return Some(op("ext.w", &format!("d{reg}"))),
            0x48C0 => return Some(op("ext.l", &format!("d{reg}"))),
            _ => {}
        }

        let mode = (opcode >> 3) & 7;
        match opcode & 0xFFC0 {
            0x4E80 | 0x4EC0 => {
                if matches!(mode, 0 | 1 | 3 | 4) {
                    return None;
                }
                let mnemonic = if opcode & 0x0040 != 0 { "jmp" } else { "jsr" };
                let target = self.ea_low(opcode, Size::Long)?;
                return Some(op(mnemonic, &target));
            }
            0x4840 => {
                let src = self.ea_low(opcode, Size::Long)?;
                return Some(op("pea", &src));
            }
            0x40C0 => {
                let dst = self.ea_low(opcode, Size::Word)?;
                return Some(op("move.w", &format!("sr,{dst}")));
            }
            0x44C0 => {
                let src = self.ea_low(opcode, Size::Word)?;
                return Some(op("move.w", &format!("{src},ccr")));
            }
            0x46C0 => {
                let src = self.ea_low(opcode, Size::Word)?;
                return Some(op("move.w", &format!("{src},sr")));
            }
            0x4800 => {
                let dst = self.ea_low(opcode, Size::Byte)?;
                return Some(op("nbcd", &dst));
            }
            0x4AC0 => {
                let dst = self.ea_low(opcode, Size::Byte)?;
                return Some(op("tas", &dst));
            }
            _ => {}
        }

        // MOVEM: 0100 1d00 1s <ea>
        if opcode & 0xFB80 == 0x4880 {
            let size = if opcode & 0x0040 != 0 { Size::Long } else { Size::Word };
            let mask = self.next_word();
            let list = register_list(mask, mode == 4);
            let ea = self.ea_low(opcode, size)?;
            let operands = if opcode & 0x0400 != 0 {
                format!("{ea},{list}")
            } else {
                format!("{list},{ea}")
            };
            return Some(op(&format!("movem{}", size.suffix()), &operands));
        }

        let an_dn = (opcode >> 9) & 7;
        match opcode & 0xF1C0 {
            0x41C0 => {
                let src = self.ea_low(opcode, Size::Long)?;
                return Some(op("lea", &format!("{src},a{an_dn}")));
            }
            0x4180 => {
                let src = self.ea_low(opcode, Size::Word)?;
                return Some(op("chk.w", &format!("{src},d{an_dn}")));
            }
            _ => {}
        }

        let mnemonic = match opcode & 0xFF00 {
            0x4000 => "negx",
            0x4200 => "clr",
            0x4400 => "neg",
            0x4600 => "not",
            0x4A00 => "tst",
            _ => return None,
        };
        let size = Size::from_bits(opcode >> 6)?;
        let dst = self.ea_low(opcode, size)?;
        Some(op(&format!("{mnemonic}{}", size.suffix()), &dst))
    }

    fn decode_quick(&mut self, opcode: u16) -> Option<String> {
        let cond = CONDITIONS[usize::from((opcode >> 8) & 0xF)];
        if (opcode >> 6) & 3 == 3 {
            if (opcode >> 3) & 7 == 1 {
                let disp = i32::from(self.next_word() as i16);
                let target = self.branch_target(disp);
                let mnemonic = if cond == "f" { "dbra".to_string() } else { format!("db{cond}") };
                return Some(op(&mnemonic, &format!("d{},${target:x}", opcode & 7)));
            }
            let dst = self.ea_low(opcode, Size::Byte)?;
            return Some(op(&format!("s{cond}"), &dst));
        }

        let size = Size::from_bits(opcode >> 6)?;
        let data = match (opcode >> 9) & 7 {
            0 => 8,
            n => n,
        };
        let mnemonic = if opcode & 0x0100 != 0 { "subq" } else { "addq" };
        let dst = self.ea_low(opcode, size)?;
        Some(op(&format!("{mnemonic}{}", size.suffix()), &format!("#{data},{dst}")))
    }

    /// `<op>.s <ea>,Dn` or `<op>.s Dn,<ea>` by the direction bit.
    fn decode_dn_ea(&mut self, opcode: u16, mnemonic: &str) -> Option<String> {
        let size = Size::from_bits(opcode >> 6)?;
        let dn = (opcode >> 9) & 7;
        let ea = self.ea_low(opcode, size)?;
        let operands = if opcode & 0x0100 != 0 {
            format!("d{dn},{ea}")
        } else {
            format!("{ea},d{dn}")
        };
        Some(op(&format!("{mnemonic}{}", size.suffix()), &operands))
    }

    /// ABCD/SBCD/ADDX/SUBX register or predecrement pair.
    fn decode_extended(opcode: u16, mnemonic: &str) -> String {
        let rx = (opcode >> 9) & 7;
        let ry = opcode & 7;
        if opcode & 0x0008 != 0 {
            op(mnemonic, &format!("-(a{ry}),-(a{rx})"))
        } else {
            op(mnemonic, &format!("d{ry},d{rx}"))
        }
    }

    fn decode_or_div(&mut self, opcode: u16) -> Option<String> {
        let dn = (opcode >> 9) & 7;
        match (opcode >> 6) & 7 {
            3 | 7 => {
                let mnemonic = if opcode & 0x0100 != 0 { "divs.w" } else { "divu.w" };
                let src = self.ea_low(opcode, Size::Word)?;
                Some(op(mnemonic, &format!("{src},d{dn}")))
            }
            _ if opcode & 0x01F0 == 0x0100 => Some(Self::decode_extended(opcode, "sbcd")),
            _ => self.decode_dn_ea(opcode, "or"),
        }
    }

    fn decode_and_mul(&mut self, opcode: u16) -> Option<String> {
        let dn = (opcode >> 9) & 7;
        let ry = opcode & 7;
        match opcode & 0x01F8 {
            0x0140 => return Some(op("exg", &format!("d{dn},d{ry}"))),
            0x0148 => return Some(op("exg", &format!("a{dn},a{ry}"))),
            0x0188 => return Some(op("exg", &format!("d{dn},a{ry}"))),
            _ => {}
        }
        match (opcode >> 6) & 7 {
            3 | 7 => {
                let mnemonic = if opcode & 0x0100 != 0 { "muls.w" } else { "mulu.w" };
                let src = self.ea_low(opcode, Size::Word)?;
                Some(op(mnemonic, &format!("{src},d{dn}")))
            }
            _ if opcode & 0x01F0 == 0x0100 => Some(Self::decode_extended(opcode, "abcd")),
            _ => self.decode_dn_ea(opcode, "and"),
        }
    }

    fn decode_arith(&mut self, opcode: u16, base: &str) -> Option<String> {
        let reg = (opcode >> 9) & 7;
        match (opcode >> 6) & 7 {
            3 | 7 => {
                let size = if opcode & 0x0100 != 0 { Size::Long } else { Size::Word };
                let src = self.ea_low(opcode, size)?;
                Some(op(&format!("{base}a{}", size.suffix()), &format!("{src},a{reg}")))
            }
            4..=6 if opcode & 0x0030 == 0 => {
                let size = Size::from_bits(opcode >> 6)?;
                Some(Self::decode_extended(opcode, &format!("{base}x{}", size.suffix())))
            }
            _ => self.decode_dn_ea(opcode, base),
        }
    }

    fn decode_cmp_eor(&mut self, opcode: u16) -> Option<String> {
        let reg = (opcode >> 9) & 7;
        match (opcode >> 6) & 7 {
            0..=2 => self.decode_dn_ea(opcode, "cmp"),
            3 | 7 => {
                let size = if opcode & 0x0100 != 0 { Size::Long } else { Size::Word };
                let src = self.ea_low(opcode, size)?;
                Some(op(&format!("cmpa{}", size.suffix()), &format!("{src},a{reg}")))
            }
            _ if (opcode >> 3) & 7 == 1 => {
                let size = Size::from_bits(opcode >> 6)?;
                Some(op(
                    &format!("cmpm{}", size.suffix()),
                    &format!("(a{})+,(a{reg})+", opcode & 7),
                ))
            }
            _ => self.decode_dn_ea(opcode, "eor"),
        }
    }

    fn decode_shift(&mut self, opcode: u16) -> Option<String> {
        let dir = if opcode & 0x0100 != 0 { 'l' } else { 'r' };
        if (opcode >> 6) & 3 == 3 {
            // Memory form: always one bit, word size
            let kind = ["as", "ls", "rox", "ro"][usize::from((opcode >> 9) & 3)];
            if opcode & 0x0800 != 0 {
                return None;
            }
            let dst = self.ea_low(opcode, Size::Word)?;
            return Some(op(&format!("{kind}{dir}.w"), &dst));
        }

        let size = Size::from_bits(opcode >> 6)?;
        let kind = ["as", "ls", "rox", "ro"][usize::from((opcode >> 3) & 3)];
        let count = (opcode >> 9) & 7;
        let count = if opcode & 0x0020 != 0 {
            format!("d{count}")
        } else {
            format!("#{}", if count == 0 { 8 } else { count })
        };
        Some(op(
            &format!("{kind}{dir}{}", size.suffix()),
            &format!("{count},d{}", opcode & 7),
        ))
    }
}
