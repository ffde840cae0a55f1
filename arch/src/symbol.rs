use indexmap::IndexMap;

/// First address handed to user variables.
pub const VAR_BASE: u16 = 16;
/// Initial stack pointer value installed by the bootstrap.
pub const STACK_BASE: u16 = 256;
/// The temp segment lives in R5..R12.
pub const TEMP_BASE: u16 = 5;
pub const TEMP_SIZE: u16 = 8;
pub const POINTER_SIZE: u16 = 2;
pub const STATIC_SIZE: u16 = 240;
/// Largest address expressible in a 15-bit address instruction.
pub const ADDR_MAX: u16 = 32767;

/// Registers and memory-mapped devices every translation unit starts with.
pub const PREDEFINED: &[(&str, u16)] = &[
    ("SP", 0),
    ("LCL", 1),
    ("ARG", 2),
    ("THIS", 3),
    ("THAT", 4),
    ("R0", 0),
    ("R1", 1),
    ("R2", 2),
    ("R3", 3),
    ("R4", 4),
    ("R5", 5),
    ("R6", 6),
    ("R7", 7),
    ("R8", 8),
    ("R9", 9),
    ("R10", 10),
    ("R11", 11),
    ("R12", 12),
    ("R13", 13),
    ("R14", 14),
    ("R15", 15),
    ("SCREEN", 16384),
    ("KBD", 24576),
];

/// Case-sensitive symbol-to-address map for one translation unit. Label
/// definitions happen in the assembler's first pass; variables are
/// allocated on first reference in the second, from `VAR_BASE` upward.
pub struct SymbolTable {
    syms: IndexMap<String, u16>,
    next_var: u16,
}

impl SymbolTable {
    pub fn new() -> Self {
        let mut syms = IndexMap::new();
        for (name, addr) in PREDEFINED {
            syms.insert(name.to_string(), *addr);
        }
        SymbolTable {
            syms,
            next_var: VAR_BASE,
        }
    }

    /// Record a label definition. Returns the previous address if the name
    /// was already taken (predefined entries included), which the caller
    /// must treat as a redefinition error.
    pub fn define(&mut self, name: &str, addr: u16) -> Option<u16> {
        match self.syms.get(name) {
            Some(prev) => Some(*prev),
            None => {
                self.syms.insert(name.to_string(), addr);
                None
            }
        }
    }

    /// Look up a symbol, allocating the next free variable address on a
    /// miss. Repeated lookups of the same name are stable.
    pub fn resolve(&mut self, name: &str) -> u16 {
        if let Some(addr) = self.syms.get(name) {
            return *addr;
        }
        let addr = self.next_var;
        self.next_var += 1;
        self.syms.insert(name.to_string(), addr);
        addr
    }

    pub fn get(&self, name: &str) -> Option<u16> {
        self.syms.get(name).copied()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
