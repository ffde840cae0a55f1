use std::fs::File;
use std::io::{self, BufRead, BufReader};

use arch::alu::alu;

/// 15-bit address space.
pub const RAM_SIZE: usize = 32768;

/// The Hack machine: instruction ROM, data RAM and the three registers.
pub struct Machine {
    rom: Vec<u16>,
    pub ram: Vec<u16>,
    pub a: u16,
    pub d: u16,
    pub pc: u16,
}

impl Machine {
    pub fn new() -> Self {
        Machine {
            rom: vec![],
            ram: vec![0; RAM_SIZE],
            a: 0,
            d: 0,
            pc: 0,
        }
    }

    pub fn load(&mut self, words: &[u16]) {
        self.rom = words.to_vec();
    }

    /// Load a `.hack` text file: one 16-character binary line per word.
    pub fn load_rom_file(&mut self, path: &str) -> io::Result<()> {
        let file = File::open(path)?;
        let mut rom = vec![];
        for line in BufReader::new(file).lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let word = u16::from_str_radix(line, 2)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
            rom.push(word);
        }
        self.rom = rom;
        Ok(())
    }

    /// Execute one instruction. Returns false once the program counter
    /// runs off the end of the ROM.
    pub fn step(&mut self) -> bool {
        let Some(&code) = self.rom.get(self.pc as usize) else {
            return false;
        };

        // A-instruction: load the address register.
        if code & 0x8000 == 0 {
            self.a = code;
            self.pc += 1;
            return true;
        }

        // C-instruction: comp through the ALU, then dest bits, then jump.
        let comp = (code >> 6) & 0x7F;
        let y = if comp & 0x40 != 0 {
            self.ram[self.addr()]
        } else {
            self.a
        };
        let out = alu(self.d, y, comp);

        // M is written at the pre-instruction address even when A is also
        // a destination.
        if code & 0b0000_1000 != 0 {
            let addr = self.addr();
            self.ram[addr] = out;
        }
        if code & 0b0001_0000 != 0 {
            self.d = out;
        }
        if code & 0b0010_0000 != 0 {
            self.a = out;
        }

        let signed = out as i16;
        let jump = match code & 0b111 {
            0b000 => false,
            0b001 => signed > 0,
            0b010 => signed == 0,
            0b011 => signed >= 0,
            0b100 => signed < 0,
            0b101 => signed != 0,
            0b110 => signed <= 0,
            _ => true,
        };
        if jump {
            self.pc = self.a;
        } else {
            self.pc += 1;
        }
        true
    }

    pub fn run(&mut self, tmax: u64) {
        for _ in 0..tmax {
            if !self.step() {
                break;
            }
        }
    }

    fn addr(&self) -> usize {
        (self.a as usize) & (RAM_SIZE - 1)
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}
