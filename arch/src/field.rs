use strum::{Display, EnumIter, EnumString};

/// Destination field of a compute instruction. The discriminant is the
/// 3-bit encoding: bit 2 loads A, bit 1 loads D, bit 0 loads M.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, EnumIter)]
pub enum Dest {
    M = 0b001,
    D = 0b010,
    MD = 0b011,
    A = 0b100,
    AM = 0b101,
    AD = 0b110,
    AMD = 0b111,
}

impl Dest {
    pub fn code(self) -> u16 {
        self as u16
    }
}

/// Jump field of a compute instruction. The discriminant is the 3-bit
/// encoding; an absent field encodes as 000.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, EnumIter)]
pub enum Jump {
    JGT = 0b001,
    JEQ = 0b010,
    JGE = 0b011,
    JLT = 0b100,
    JNE = 0b101,
    JLE = 0b110,
    JMP = 0b111,
}

impl Jump {
    pub fn code(self) -> u16 {
        self as u16
    }
}

/// Computation field. Bit 6 is the a-bit (selects M over A as the second
/// operand), bits 5..0 are the ALU control bits zx, nx, zy, ny, f, no.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, EnumIter)]
pub enum Comp {
    #[strum(serialize = "0")]
    Zero,
    #[strum(serialize = "1")]
    One,
    #[strum(serialize = "-1")]
    MinusOne,
    #[strum(serialize = "D")]
    D,
    #[strum(serialize = "A")]
    A,
    #[strum(serialize = "!D")]
    NotD,
    #[strum(serialize = "!A")]
    NotA,
    #[strum(serialize = "-D")]
    MinusD,
    #[strum(serialize = "-A")]
    MinusA,
    #[strum(serialize = "D+1")]
    DPlusOne,
    #[strum(serialize = "A+1")]
    APlusOne,
    #[strum(serialize = "D-1")]
    DMinusOne,
    #[strum(serialize = "A-1")]
    AMinusOne,
    #[strum(serialize = "D+A")]
    DPlusA,
    #[strum(serialize = "D-A")]
    DMinusA,
    #[strum(serialize = "A-D")]
    AMinusD,
    #[strum(serialize = "D&A")]
    DAndA,
    #[strum(serialize = "D|A")]
    DOrA,
    #[strum(serialize = "M")]
    M,
    #[strum(serialize = "!M")]
    NotM,
    #[strum(serialize = "-M")]
    MinusM,
    #[strum(serialize = "M+1")]
    MPlusOne,
    #[strum(serialize = "M-1")]
    MMinusOne,
    #[strum(serialize = "D+M")]
    DPlusM,
    #[strum(serialize = "D-M")]
    DMinusM,
    #[strum(serialize = "M-D")]
    MMinusD,
    #[strum(serialize = "D&M")]
    DAndM,
    #[strum(serialize = "D|M")]
    DOrM,
}

impl Comp {
    pub fn code(self) -> u16 {
        use Comp::*;
        match self {
            Zero => 0b0101010,
            One => 0b0111111,
            MinusOne => 0b0111010,
            D => 0b0001100,
            A => 0b0110000,
            NotD => 0b0001101,
            NotA => 0b0110001,
            MinusD => 0b0001111,
            MinusA => 0b0110011,
            DPlusOne => 0b0011111,
            APlusOne => 0b0110111,
            DMinusOne => 0b0001110,
            AMinusOne => 0b0110010,
            DPlusA => 0b0000010,
            DMinusA => 0b0010011,
            AMinusD => 0b0000111,
            DAndA => 0b0000000,
            DOrA => 0b0010101,
            M => 0b1110000,
            NotM => 0b1110001,
            MinusM => 0b1110011,
            MPlusOne => 0b1110111,
            MMinusOne => 0b1110010,
            DPlusM => 0b1000010,
            DMinusM => 0b1010011,
            MMinusD => 0b1000111,
            DAndM => 0b1000000,
            DOrM => 0b1010101,
        }
    }

    /// The a-bit: second ALU operand comes from M instead of A.
    pub fn reads_m(self) -> bool {
        self.code() & 0b1000000 != 0
    }
}
