//! ISA extension-set selection.

use std::fmt;
use std::str::FromStr;

/// Enabled extension set for decode.
///
/// The base integer ISA plus M and A are always present; the four supported
/// profiles differ only in F/D and C. The set is fixed at startup and
/// consulted on the decode path only (the executor never sees an opcode
/// from a disabled extension).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Isa {
    pub f: bool,
    pub d: bool,
    pub c: bool,
}

impl Isa {
    pub const IMA: Isa = Isa {
        f: false,
        d: false,
        c: false,
    };
    pub const IMAC: Isa = Isa {
        f: false,
        d: false,
        c: true,
    };
    pub const IMAFD: Isa = Isa {
        f: true,
        d: true,
        c: false,
    };
    pub const IMAFDC: Isa = Isa {
        f: true,
        d: true,
        c: true,
    };
}

impl Default for Isa {
    fn default() -> Self {
        Isa::IMAFDC
    }
}

impl fmt::Display for Isa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IMA{}{}",
            if self.f { "FD" } else { "" },
            if self.c { "C" } else { "" }
        )
    }
}

/// Error for an ISA string outside the supported profiles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownIsa(pub String);

impl fmt::Display for UnknownIsa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown isa extension: {}", self.0)
    }
}

impl std::error::Error for UnknownIsa {}

impl FromStr for Isa {
    type Err = UnknownIsa;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "IMA" => Ok(Isa::IMA),
            "IMAC" => Ok(Isa::IMAC),
            "IMAFD" => Ok(Isa::IMAFD),
            "IMAFDC" => Ok(Isa::IMAFDC),
            _ => Err(UnknownIsa(s.to_string())),
        }
    }
}
